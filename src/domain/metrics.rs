//! Summary statistics for a cumulative return series.

use super::evaluation::CumulativeSeries;
use super::stats;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
}

impl PerformanceSummary {
    pub fn compute(series: &CumulativeSeries, trading_days: f64) -> Self {
        let total_return = series.final_value();

        let periods = series.returns.len() as f64;
        let years = periods / trading_days;
        let annualized_return = if years > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let mean = stats::mean(&series.returns);
        let stddev = stats::std_dev(&series.returns);
        let annualized_volatility = stddev * trading_days.sqrt();

        let sharpe_ratio = if stddev > 0.0 {
            (mean / stddev) * trading_days.sqrt()
        } else {
            0.0
        };

        let wealth: Vec<f64> = series.points.iter().map(|p| 1.0 + p.value).collect();
        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&wealth);

        PerformanceSummary {
            total_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
        }
    }
}

/// Largest peak-to-trough decline of a wealth curve starting at 1.0, and the
/// longest run of periods spent below a prior peak.
fn compute_drawdown(wealth: &[f64]) -> (f64, usize) {
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;
    let mut max_duration = 0usize;
    let mut duration = 0usize;

    for &w in wealth {
        if w >= peak {
            peak = w;
            duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - w) / peak);
            duration += 1;
            max_duration = max_duration.max(duration);
        }
    }

    (max_dd, max_duration)
}
