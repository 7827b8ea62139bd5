//! Price data access port.

use crate::domain::error::SharpefolioError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Adjusted close prices for `asset_id` within `[start_date, end_date]`,
    /// sorted by date.
    fn fetch_prices(
        &self,
        asset_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SharpefolioError>;

    fn list_assets(&self) -> Result<Vec<String>, SharpefolioError>;

    /// First date, last date and point count of everything stored for
    /// `asset_id`, or `None` when nothing is stored.
    fn get_data_range(
        &self,
        asset_id: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SharpefolioError>;
}
