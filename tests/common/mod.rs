#![allow(dead_code)]

use chrono::NaiveDate;
use sharpefolio::domain::analysis::AnalysisConfig;
use sharpefolio::domain::error::SharpefolioError;
use sharpefolio::domain::price::{PriceHistory, PricePoint, PriceSeries};
use sharpefolio::ports::data_port::PriceDataPort;
use std::collections::HashMap;

pub struct MockPriceDataPort {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockPriceDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.data.insert(series.asset_id.clone(), series);
        self
    }

    pub fn with_error(mut self, asset_id: &str, reason: &str) -> Self {
        self.errors.insert(asset_id.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockPriceDataPort {
    fn fetch_prices(
        &self,
        asset_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SharpefolioError> {
        if let Some(reason) = self.errors.get(asset_id) {
            return Err(SharpefolioError::Data {
                reason: reason.clone(),
            });
        }
        let points = self
            .data
            .get(asset_id)
            .map(|s| {
                s.points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(PriceSeries::new(asset_id, points))
    }

    fn list_assets(&self) -> Result<Vec<String>, SharpefolioError> {
        let mut ids: Vec<String> = self.data.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn get_data_range(
        &self,
        asset_id: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SharpefolioError> {
        if let Some(reason) = self.errors.get(asset_id) {
            return Err(SharpefolioError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(asset_id).and_then(|s| {
            Some((s.first_date()?, s.last_date()?, s.len()))
        }))
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Consecutive calendar days starting 2024-01-01.
pub fn dates(n: usize) -> Vec<NaiveDate> {
    let start = date("2024-01-01");
    (0..n)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

pub fn price_series(asset_id: &str, closes: &[f64]) -> PriceSeries {
    let points = dates(closes.len())
        .into_iter()
        .zip(closes)
        .map(|(date, &adj_close)| PricePoint { date, adj_close })
        .collect();
    PriceSeries::new(asset_id, points)
}

/// Prices compounded from a list of daily returns, starting at 100.
pub fn series_from_returns(asset_id: &str, returns: &[f64]) -> PriceSeries {
    let mut closes = vec![100.0];
    for r in returns {
        let last = *closes.last().unwrap();
        closes.push(last * (1.0 + r));
    }
    price_series(asset_id, &closes)
}

pub fn make_history(series: Vec<PriceSeries>) -> PriceHistory {
    series
        .into_iter()
        .map(|s| (s.asset_id.clone(), s))
        .collect()
}

/// Three assets with distinct return profiles plus a benchmark.
pub fn sample_port() -> MockPriceDataPort {
    MockPriceDataPort::new()
        .with_series(series_from_returns(
            "AAA",
            &[0.010, -0.004, 0.012, 0.003, -0.002, 0.008, 0.001, 0.006, -0.003, 0.009],
        ))
        .with_series(series_from_returns(
            "BBB",
            &[-0.002, 0.006, 0.001, -0.004, 0.007, 0.000, 0.005, -0.001, 0.004, 0.002],
        ))
        .with_series(series_from_returns(
            "CCC",
            &[0.020, -0.025, 0.015, -0.010, 0.018, -0.020, 0.012, -0.008, 0.010, -0.005],
        ))
        .with_series(series_from_returns(
            "SPY",
            &[0.004, 0.001, 0.003, -0.002, 0.002, 0.003, -0.001, 0.002, 0.001, 0.002],
        ))
}

pub fn sample_config() -> AnalysisConfig {
    AnalysisConfig::new(
        vec!["AAA".into(), "BBB".into(), "CCC".into()],
        date("2024-01-01"),
        date("2024-12-31"),
    )
}
