//! Daily return series and date alignment across assets.

use crate::domain::error::SharpefolioError;
use crate::domain::price::{PriceHistory, PriceSeries};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    pub asset_id: String,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

/// Return series keyed by asset id. Iteration order is the asset order used
/// for weight vectors.
pub type ReturnSet = BTreeMap<String, ReturnSeries>;

impl ReturnSeries {
    pub fn from_prices(prices: &PriceSeries) -> Self {
        let (dates, values) = prices.pct_change().into_iter().unzip();
        Self {
            asset_id: prices.asset_id.clone(),
            dates,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Dates on which every listed asset has a price.
pub fn common_dates(
    history: &PriceHistory,
    asset_ids: &[String],
) -> Result<Vec<NaiveDate>, SharpefolioError> {
    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for id in asset_ids {
        let series = history.get(id).ok_or_else(|| SharpefolioError::NoData {
            asset_id: id.clone(),
        })?;
        let dates: BTreeSet<NaiveDate> = series.points.iter().map(|p| p.date).collect();
        common = Some(match common {
            None => dates,
            Some(acc) => acc.intersection(&dates).copied().collect(),
        });
    }
    Ok(common.unwrap_or_default().into_iter().collect())
}

/// Builds return series for `asset_ids` on their shared date index. Prices
/// are first restricted to dates every asset trades on, so all resulting
/// series have identical dates and length.
pub fn aligned_returns(
    history: &PriceHistory,
    asset_ids: &[String],
) -> Result<ReturnSet, SharpefolioError> {
    let dates: BTreeSet<NaiveDate> = common_dates(history, asset_ids)?.into_iter().collect();

    let mut set = ReturnSet::new();
    for id in asset_ids {
        let series = &history[id];
        let restricted = PriceSeries::new(
            id.clone(),
            series
                .points
                .iter()
                .filter(|p| dates.contains(&p.date))
                .cloned()
                .collect(),
        );
        set.insert(id.clone(), ReturnSeries::from_prices(&restricted));
    }
    Ok(set)
}
