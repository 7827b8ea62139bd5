//! End-to-end analysis run: load prices, optimize, evaluate, plan.
//!
//! `AnalysisConfig` carries every parameter of a run; nothing is global.

use chrono::NaiveDate;
use tracing::info;

use crate::domain::error::SharpefolioError;
use crate::domain::evaluation::{evaluate_weights, Evaluation};
use crate::domain::execution_plan::{ExecutionPlan, DEFAULT_MIN_WEIGHT};
use crate::domain::metrics::PerformanceSummary;
use crate::domain::optimizer::{ConvergencePolicy, Optimization, Optimizer, OptimizerConfig};
use crate::domain::price::PriceHistory;
use crate::domain::returns::aligned_returns;
use crate::ports::data_port::PriceDataPort;

pub const DEFAULT_BENCHMARK: &str = "SPY";
pub const DEFAULT_CAPITAL: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub tickers: Vec<String>,
    pub benchmark: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub capital: f64,
    pub min_weight: f64,
    pub optimizer: OptimizerConfig,
    pub convergence: ConvergencePolicy,
}

impl AnalysisConfig {
    pub fn new(tickers: Vec<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        AnalysisConfig {
            tickers,
            benchmark: DEFAULT_BENCHMARK.to_string(),
            start_date,
            end_date,
            capital: DEFAULT_CAPITAL,
            min_weight: DEFAULT_MIN_WEIGHT,
            optimizer: OptimizerConfig::default(),
            convergence: ConvergencePolicy::default(),
        }
    }

    /// Tickers followed by the benchmark, without duplicates.
    pub fn symbols_to_load(&self) -> Vec<String> {
        let mut symbols = self.tickers.clone();
        if !symbols.contains(&self.benchmark) {
            symbols.push(self.benchmark.clone());
        }
        symbols
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub config: AnalysisConfig,
    pub prices: PriceHistory,
    pub optimization: Optimization,
    pub evaluation: Evaluation,
    pub plan: ExecutionPlan,
    pub portfolio_summary: PerformanceSummary,
    pub benchmark_summary: PerformanceSummary,
}

pub fn load_prices(
    data_port: &dyn PriceDataPort,
    config: &AnalysisConfig,
) -> Result<PriceHistory, SharpefolioError> {
    let mut history = PriceHistory::new();
    for symbol in config.symbols_to_load() {
        let series = data_port.fetch_prices(&symbol, config.start_date, config.end_date)?;
        if series.is_empty() {
            return Err(SharpefolioError::NoData { asset_id: symbol });
        }
        info!(asset = %symbol, points = series.len(), "loaded prices");
        history.insert(symbol, series);
    }
    Ok(history)
}

pub fn run_analysis(
    data_port: &dyn PriceDataPort,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, SharpefolioError> {
    let prices = load_prices(data_port, config)?;
    analyze_prices(prices, config)
}

/// Runs optimization, evaluation and planning over already loaded prices.
pub fn analyze_prices(
    prices: PriceHistory,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, SharpefolioError> {
    let returns = aligned_returns(&prices, &config.tickers)?;
    info!(
        assets = returns.len(),
        observations = returns.values().next().map(|r| r.len()).unwrap_or(0),
        "computed daily returns"
    );

    let optimization = Optimizer::new(config.optimizer.clone())
        .optimize(&returns)?
        .enforce(config.convergence)?;
    info!(
        converged = optimization.converged,
        iterations = optimization.iterations,
        "optimized weights"
    );

    let evaluation = evaluate_weights(&optimization.weights, &prices, &config.benchmark)?;
    let plan = ExecutionPlan::build(
        &optimization.weights,
        &prices,
        config.capital,
        config.min_weight,
    )?;

    let trading_days = config.optimizer.trading_days;
    let portfolio_summary = PerformanceSummary::compute(&evaluation.portfolio, trading_days);
    let benchmark_summary = PerformanceSummary::compute(&evaluation.benchmark, trading_days);

    Ok(AnalysisReport {
        config: config.clone(),
        prices,
        optimization,
        evaluation,
        plan,
        portfolio_summary,
        benchmark_summary,
    })
}
