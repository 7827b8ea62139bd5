//! CSV file price data adapter.
//!
//! Reads `<base_path>/<ASSET_ID>.csv`. The header row must name a `date`
//! column (`YYYY-MM-DD`) and an `adj_close` column; `Adj Close` and, as a
//! last resort, `close` are accepted too.

use crate::domain::error::SharpefolioError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

const PRICE_COLUMNS: [&str; 3] = ["adj_close", "adj close", "close"];

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, asset_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", asset_id))
    }

    fn read_all(&self, asset_id: &str) -> Result<Vec<PricePoint>, SharpefolioError> {
        let path = self.csv_path(asset_id);
        if !path.exists() {
            return Err(SharpefolioError::NoData {
                asset_id: asset_id.to_string(),
            });
        }

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| SharpefolioError::Data {
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let headers = rdr.headers().map_err(|e| SharpefolioError::Data {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let date_idx = find("date").ok_or_else(|| SharpefolioError::Data {
            reason: format!("{}: missing date column", path.display()),
        })?;
        let price_idx = PRICE_COLUMNS
            .iter()
            .find_map(|name| find(*name))
            .ok_or_else(|| SharpefolioError::Data {
                reason: format!("{}: missing adj_close column", path.display()),
            })?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| SharpefolioError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = record.get(date_idx).unwrap_or_default();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SharpefolioError::Data {
                    reason: format!("invalid date {:?}: {}", date_str, e),
                }
            })?;

            let price_str = record.get(price_idx).unwrap_or_default();
            // Providers leave gaps as empty cells or "null"; skip those rows.
            if price_str.is_empty() || price_str.eq_ignore_ascii_case("null") {
                debug!(asset = asset_id, %date, "skipping row without price");
                continue;
            }
            let adj_close: f64 = price_str.parse().map_err(|e| SharpefolioError::Data {
                reason: format!("invalid price {:?} on {}: {}", price_str, date, e),
            })?;

            points.push(PricePoint { date, adj_close });
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

impl PriceDataPort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        asset_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SharpefolioError> {
        let points = self
            .read_all(asset_id)?
            .into_iter()
            .filter(|p| p.date >= start_date && p.date <= end_date)
            .collect();
        Ok(PriceSeries::new(asset_id, points))
    }

    fn list_assets(&self) -> Result<Vec<String>, SharpefolioError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SharpefolioError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut assets = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SharpefolioError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            if let Some(id) = name.to_string_lossy().strip_suffix(".csv") {
                assets.push(id.to_string());
            }
        }

        assets.sort();
        Ok(assets)
    }

    fn get_data_range(
        &self,
        asset_id: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SharpefolioError> {
        let points = match self.read_all(asset_id) {
            Ok(points) => points,
            Err(SharpefolioError::NoData { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        match (points.first(), points.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, points.len()))),
            _ => Ok(None),
        }
    }
}
