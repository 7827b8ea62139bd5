//! Cumulative performance of a weighted portfolio against a benchmark.

use crate::domain::error::SharpefolioError;
use crate::domain::price::PriceHistory;
use crate::domain::returns::common_dates;
use crate::domain::weights::WeightVector;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeSeries {
    pub label: String,
    pub points: Vec<CumulativePoint>,
    /// Per-date returns the series was compounded from.
    pub returns: Vec<f64>,
}

impl CumulativeSeries {
    pub fn from_returns(label: impl Into<String>, dates: &[NaiveDate], returns: Vec<f64>) -> Self {
        let points = dates
            .iter()
            .zip(cumulative_returns(&returns))
            .map(|(&date, value)| CumulativePoint { date, value })
            .collect();
        Self {
            label: label.into(),
            points,
            returns,
        }
    }

    pub fn final_value(&self) -> f64 {
        self.points.last().map(|p| p.value).unwrap_or(0.0)
    }

    /// Final cumulative return × 100.
    pub fn net_return_pct(&self) -> f64 {
        self.final_value() * 100.0
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub portfolio: CumulativeSeries,
    pub benchmark: CumulativeSeries,
    pub portfolio_net_return_pct: f64,
    pub benchmark_net_return_pct: f64,
}

/// value[t] = Π(1 + r[0..=t]) − 1
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |wealth, r| {
            *wealth *= 1.0 + r;
            Some(*wealth - 1.0)
        })
        .collect()
}

/// Evaluates `weights` over `prices` on the dates where every weighted
/// asset and the benchmark have a price. The first such date has no prior
/// price and is excluded.
pub fn evaluate(
    weights: &[f64],
    asset_ids: &[String],
    prices: &PriceHistory,
    benchmark_id: &str,
) -> Result<Evaluation, SharpefolioError> {
    if weights.len() != asset_ids.len() {
        return Err(SharpefolioError::invalid_input(format!(
            "{} weights for {} assets",
            weights.len(),
            asset_ids.len()
        )));
    }
    if asset_ids.is_empty() {
        return Err(SharpefolioError::invalid_input("no assets to evaluate"));
    }
    if !prices.contains_key(benchmark_id) {
        return Err(SharpefolioError::MissingBenchmark {
            asset_id: benchmark_id.to_string(),
        });
    }
    if let Some(missing) = asset_ids.iter().find(|id| !prices.contains_key(*id)) {
        return Err(SharpefolioError::invalid_input(format!(
            "no prices for weighted asset {}",
            missing
        )));
    }

    let mut ids: Vec<String> = asset_ids.to_vec();
    if !ids.iter().any(|id| id == benchmark_id) {
        ids.push(benchmark_id.to_string());
    }
    let dates = common_dates(prices, &ids)?;

    let lookup: BTreeMap<&str, BTreeMap<NaiveDate, f64>> = ids
        .iter()
        .map(|id| (id.as_str(), prices[id].by_date()))
        .collect();

    let period_return = |id: &str,
                         prev: NaiveDate,
                         curr: NaiveDate|
     -> Result<f64, SharpefolioError> {
        let series = &lookup[id];
        let (p0, p1) = (series[&prev], series[&curr]);
        if p0 <= 0.0 || !p0.is_finite() || !p1.is_finite() {
            return Err(SharpefolioError::invalid_input(format!(
                "{} has a non-positive or non-finite price on {}",
                id, prev
            )));
        }
        Ok(p1 / p0 - 1.0)
    };

    let mut return_dates = Vec::with_capacity(dates.len().saturating_sub(1));
    let mut portfolio_returns = Vec::with_capacity(return_dates.capacity());
    let mut benchmark_returns = Vec::with_capacity(return_dates.capacity());

    for pair in dates.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let mut r = 0.0;
        for (id, w) in asset_ids.iter().zip(weights) {
            r += w * period_return(id, prev, curr)?;
        }
        return_dates.push(curr);
        portfolio_returns.push(r);
        benchmark_returns.push(period_return(benchmark_id, prev, curr)?);
    }

    let portfolio = CumulativeSeries::from_returns("Portfolio", &return_dates, portfolio_returns);
    let benchmark = CumulativeSeries::from_returns(benchmark_id, &return_dates, benchmark_returns);

    Ok(Evaluation {
        portfolio_net_return_pct: portfolio.net_return_pct(),
        benchmark_net_return_pct: benchmark.net_return_pct(),
        portfolio,
        benchmark,
    })
}

/// [`evaluate`] for a [`WeightVector`].
pub fn evaluate_weights(
    weights: &WeightVector,
    prices: &PriceHistory,
    benchmark_id: &str,
) -> Result<Evaluation, SharpefolioError> {
    evaluate(&weights.weights, &weights.asset_ids, prices, benchmark_id)
}
