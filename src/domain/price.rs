//! Adjusted-close price series.

use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adj_close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub asset_id: String,
    pub points: Vec<PricePoint>,
}

/// Price history keyed by asset id.
pub type PriceHistory = BTreeMap<String, PriceSeries>;

impl PriceSeries {
    /// Builds a series, sorting points by date.
    pub fn new(asset_id: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            asset_id: asset_id.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn last_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.adj_close)
    }

    /// Date → price lookup.
    pub fn by_date(&self) -> BTreeMap<NaiveDate, f64> {
        self.points.iter().map(|p| (p.date, p.adj_close)).collect()
    }

    /// Period-over-period fractional change. The first point has no
    /// predecessor and yields nothing, so the output has `len() - 1` entries
    /// dated at the later point of each pair.
    pub fn pct_change(&self) -> Vec<(NaiveDate, f64)> {
        self.points
            .windows(2)
            .map(|w| (w[1].date, w[1].adj_close / w[0].adj_close - 1.0))
            .collect()
    }
}
