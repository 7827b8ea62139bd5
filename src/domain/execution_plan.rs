//! Turns target weights into whole-share orders at the latest prices.

use crate::domain::error::SharpefolioError;
use crate::domain::price::PriceHistory;
use crate::domain::weights::WeightVector;

pub const DEFAULT_MIN_WEIGHT: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedOrder {
    pub asset_id: String,
    pub weight: f64,
    pub allocation: f64,
    pub price: f64,
    pub quantity: i64,
}

impl PlannedOrder {
    pub fn cost(&self) -> f64 {
        self.quantity as f64 * self.price
    }

    pub fn is_skipped(&self) -> bool {
        self.quantity == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    pub capital: f64,
    pub orders: Vec<PlannedOrder>,
}

impl ExecutionPlan {
    /// Sizes one buy order per asset: allocation = capital × weight,
    /// quantity = ⌊allocation / price⌋. Weights below `min_weight` get no
    /// shares.
    pub fn build(
        weights: &WeightVector,
        prices: &PriceHistory,
        capital: f64,
        min_weight: f64,
    ) -> Result<Self, SharpefolioError> {
        if !(capital > 0.0) || !capital.is_finite() {
            return Err(SharpefolioError::invalid_input(format!(
                "capital must be positive, got {}",
                capital
            )));
        }

        let mut orders = Vec::with_capacity(weights.len());
        for (asset_id, weight) in weights.iter() {
            let price = prices
                .get(asset_id)
                .and_then(|s| s.last_price())
                .ok_or_else(|| SharpefolioError::NoData {
                    asset_id: asset_id.to_string(),
                })?;
            if !(price > 0.0) || !price.is_finite() {
                return Err(SharpefolioError::invalid_input(format!(
                    "latest price for {} must be positive, got {}",
                    asset_id, price
                )));
            }

            let allocation = capital * weight;
            let quantity = if weight < min_weight {
                0
            } else {
                (allocation / price).floor() as i64
            };

            orders.push(PlannedOrder {
                asset_id: asset_id.to_string(),
                weight,
                allocation,
                price,
                quantity,
            });
        }

        Ok(ExecutionPlan { capital, orders })
    }

    pub fn invested(&self) -> f64 {
        self.orders.iter().map(PlannedOrder::cost).sum()
    }

    pub fn cash_remainder(&self) -> f64 {
        self.capital - self.invested()
    }
}
