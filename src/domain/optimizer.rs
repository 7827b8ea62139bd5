//! Maximum-Sharpe portfolio optimizer.
//!
//! Maximizes the annualized Sharpe ratio over long-only, fully invested
//! weight vectors by projected-gradient ascent: every iterate is projected
//! onto the probability simplex, so the bound and budget constraints hold
//! exactly, and an Armijo backtracking line search controls the step.

use crate::domain::error::SharpefolioError;
use crate::domain::returns::ReturnSet;
use crate::domain::stats::{self, Matrix};
use crate::domain::weights::{project_onto_simplex, WeightVector};
use tracing::{debug, trace, warn};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Portfolio volatilities at or below this are treated as zero.
const VOLATILITY_EPSILON: f64 = 1e-12;
const ARMIJO_C: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 60;
const MAX_STEP: f64 = 1e6;

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub trading_days: f64,
    pub max_iterations: usize,
    /// Convergence threshold on the largest per-asset weight change.
    pub tolerance: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            trading_days: TRADING_DAYS_PER_YEAR,
            max_iterations: 10_000,
            tolerance: 1e-9,
        }
    }
}

/// What to do with a result the solver did not converge on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvergencePolicy {
    /// Log a warning and keep the best-effort weights.
    #[default]
    Warn,
    /// Fail with [`SharpefolioError::SolverNonConvergence`].
    Strict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Optimization {
    pub weights: WeightVector,
    pub converged: bool,
    pub iterations: usize,
    pub annual_return: f64,
    pub annual_volatility: f64,
    /// `None` when the optimum is a riskless combination (zero volatility,
    /// positive return) and the ratio is unbounded.
    pub sharpe_ratio: Option<f64>,
}

impl Optimization {
    pub fn enforce(self, policy: ConvergencePolicy) -> Result<Self, SharpefolioError> {
        if self.converged {
            return Ok(self);
        }
        match policy {
            ConvergencePolicy::Warn => {
                warn!(
                    iterations = self.iterations,
                    "optimizer did not converge, using best-effort weights"
                );
                Ok(self)
            }
            ConvergencePolicy::Strict => Err(SharpefolioError::SolverNonConvergence {
                iterations: self.iterations,
            }),
        }
    }
}

/// Mean daily returns and covariance for a validated return set.
#[derive(Debug, Clone)]
struct Moments {
    mean: Vec<f64>,
    cov: Matrix,
    annualization: f64,
}

enum Evaluated {
    Sharpe(f64),
    Riskless,
    Undefined,
}

impl Moments {
    fn annual_return(&self, w: &[f64]) -> f64 {
        self.annualization * stats::dot(w, &self.mean)
    }

    fn annual_volatility(&self, w: &[f64]) -> f64 {
        self.annualization.sqrt() * stats::portfolio_variance(w, &self.cov).max(0.0).sqrt()
    }

    fn sharpe(&self, w: &[f64]) -> Evaluated {
        let vol = self.annual_volatility(w);
        if vol <= VOLATILITY_EPSILON {
            return if self.annual_return(w) > 0.0 {
                Evaluated::Riskless
            } else {
                Evaluated::Undefined
            };
        }
        Evaluated::Sharpe(self.annual_return(w) / vol)
    }

    /// ∇S = √T (μ / σ − (μ·w) Σw / σ³), σ the daily portfolio volatility.
    fn gradient(&self, w: &[f64]) -> Vec<f64> {
        let sigma_w = stats::mat_vec(&self.cov, w);
        let var = stats::dot(w, &sigma_w);
        let sigma = var.sqrt();
        let ret = stats::dot(w, &self.mean);
        let scale = self.annualization.sqrt();
        self.mean
            .iter()
            .zip(sigma_w.iter())
            .map(|(m, sw)| scale * (m / sigma - ret * sw / (sigma * var)))
            .collect()
    }
}

pub struct Optimizer {
    config: OptimizerConfig,
}

impl Default for Optimizer {
    fn default() -> Self {
        Optimizer::new(OptimizerConfig::default())
    }
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Optimizes from the equal-weight starting point.
    pub fn optimize(&self, returns: &ReturnSet) -> Result<Optimization, SharpefolioError> {
        let n = returns.len();
        let initial = vec![1.0 / n.max(1) as f64; n];
        self.optimize_from(returns, &initial)
    }

    /// Optimizes from `initial`, which is projected onto the feasible set
    /// before the first iteration.
    pub fn optimize_from(
        &self,
        returns: &ReturnSet,
        initial: &[f64],
    ) -> Result<Optimization, SharpefolioError> {
        let moments = self.moments(returns)?;
        let asset_ids: Vec<String> = returns.keys().cloned().collect();
        if initial.len() != asset_ids.len() {
            return Err(SharpefolioError::invalid_input(format!(
                "initial guess has {} weights for {} assets",
                initial.len(),
                asset_ids.len()
            )));
        }

        let mut w = project_onto_simplex(initial);
        let mut current = match moments.sharpe(&w) {
            Evaluated::Sharpe(s) => s,
            Evaluated::Riskless => {
                debug!("initial portfolio is riskless with positive return");
                return Ok(self.finish(&moments, asset_ids, w, true, 0));
            }
            Evaluated::Undefined => {
                return Err(SharpefolioError::DegenerateInput {
                    reason: "portfolio volatility is zero at the initial weights".into(),
                });
            }
        };

        let mut step = 1.0;
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            iterations += 1;
            let grad = moments.gradient(&w);

            let mut accepted: Option<(Vec<f64>, Option<f64>)> = None;
            let mut alpha = step;
            for _ in 0..MAX_BACKTRACKS {
                let trial: Vec<f64> = w.iter().zip(&grad).map(|(wi, gi)| wi + alpha * gi).collect();
                let candidate = project_onto_simplex(&trial);
                let ascent: f64 = grad
                    .iter()
                    .zip(candidate.iter().zip(&w))
                    .map(|(g, (c, wi))| g * (c - wi))
                    .sum();
                match moments.sharpe(&candidate) {
                    Evaluated::Sharpe(s) if s >= current + ARMIJO_C * ascent => {
                        accepted = Some((candidate, Some(s)));
                        break;
                    }
                    Evaluated::Riskless => {
                        accepted = Some((candidate, None));
                        break;
                    }
                    _ => alpha *= 0.5,
                }
            }

            let Some((next, sharpe)) = accepted else {
                // No ascent along the projected gradient: stationary point.
                converged = true;
                break;
            };

            let change = next
                .iter()
                .zip(&w)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0_f64, f64::max);
            w = next;
            trace!(iterations, change, alpha, "optimizer step");

            let Some(s) = sharpe else {
                debug!(iterations, "reached a riskless portfolio with positive return");
                converged = true;
                break;
            };
            current = s;

            if change <= self.config.tolerance {
                converged = true;
                break;
            }
            step = (alpha * 2.0).min(MAX_STEP);
        }

        debug!(iterations, converged, sharpe = current, "optimizer finished");
        Ok(self.finish(&moments, asset_ids, w, converged, iterations))
    }

    fn finish(
        &self,
        moments: &Moments,
        asset_ids: Vec<String>,
        weights: Vec<f64>,
        converged: bool,
        iterations: usize,
    ) -> Optimization {
        let sharpe_ratio = match moments.sharpe(&weights) {
            Evaluated::Sharpe(s) => Some(s),
            _ => None,
        };
        Optimization {
            annual_return: moments.annual_return(&weights),
            annual_volatility: moments.annual_volatility(&weights),
            sharpe_ratio,
            weights: WeightVector { asset_ids, weights },
            converged,
            iterations,
        }
    }

    fn moments(&self, returns: &ReturnSet) -> Result<Moments, SharpefolioError> {
        let trading_days = self.config.trading_days;
        if !trading_days.is_finite() || trading_days <= 0.0 {
            return Err(SharpefolioError::invalid_input(format!(
                "trading_days must be finite and positive, got {}",
                trading_days
            )));
        }
        validate_returns(returns)?;

        let columns: Vec<&[f64]> = returns.values().map(|r| r.values.as_slice()).collect();
        let mean: Vec<f64> = columns.iter().map(|c| stats::mean(c)).collect();
        let cov = stats::covariance_matrix(&columns);

        let min_variance = VOLATILITY_EPSILON * VOLATILITY_EPSILON;
        if cov.iter().enumerate().all(|(i, row)| row[i] <= min_variance) {
            return Err(SharpefolioError::DegenerateInput {
                reason: "every asset has zero return variance".into(),
            });
        }
        if mean.iter().chain(cov.iter().flatten()).any(|v| !v.is_finite()) {
            return Err(SharpefolioError::invalid_input("returns contain non-finite values"));
        }

        Ok(Moments {
            mean,
            cov,
            annualization: trading_days,
        })
    }
}

/// Optimizes with default settings from equal weights.
pub fn optimize(returns: &ReturnSet) -> Result<Optimization, SharpefolioError> {
    Optimizer::default().optimize(returns)
}

fn validate_returns(returns: &ReturnSet) -> Result<(), SharpefolioError> {
    if returns.len() < 2 {
        return Err(SharpefolioError::invalid_input(format!(
            "need at least 2 assets, got {}",
            returns.len()
        )));
    }

    let mut iter = returns.values();
    let Some(first) = iter.next() else {
        return Err(SharpefolioError::invalid_input("no return series"));
    };
    for series in returns.values() {
        if series.is_empty() {
            return Err(SharpefolioError::invalid_input(format!(
                "return series for {} is empty",
                series.asset_id
            )));
        }
        if series.dates.len() != series.values.len() {
            return Err(SharpefolioError::invalid_input(format!(
                "return series for {} has {} dates but {} values",
                series.asset_id,
                series.dates.len(),
                series.values.len()
            )));
        }
    }
    for series in iter {
        if series.len() != first.len() {
            return Err(SharpefolioError::invalid_input(format!(
                "return series lengths differ: {} has {}, {} has {}",
                first.asset_id,
                first.len(),
                series.asset_id,
                series.len()
            )));
        }
        if series.dates != first.dates {
            return Err(SharpefolioError::invalid_input(format!(
                "return series for {} and {} are on different dates",
                first.asset_id, series.asset_id
            )));
        }
    }
    Ok(())
}
