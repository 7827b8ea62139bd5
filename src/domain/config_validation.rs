//! Configuration validation.
//!
//! Validates all config fields before any price data is loaded.

use crate::domain::error::SharpefolioError;
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SharpefolioError> {
    validate_data_dir(config)?;
    validate_tickers(config)?;
    validate_dates(config)?;
    validate_benchmark(config)?;
    validate_capital(config)?;
    validate_trading_days(config)?;
    validate_min_weight(config)?;
    validate_optimizer(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SharpefolioError {
    SharpefolioError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn missing(section: &str, key: &str) -> SharpefolioError {
    SharpefolioError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), SharpefolioError> {
    match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(missing("data", "dir")),
    }
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), SharpefolioError> {
    let tickers = config
        .get_string("data", "tickers")
        .ok_or_else(|| missing("data", "tickers"))?;
    parse_tickers(&tickers).map_err(|e| invalid("data", "tickers", e.to_string()))?;
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SharpefolioError> {
    let start_date = parse_date(config.get_string("data", "start_date").as_deref(), "start_date")?;
    let end_date = parse_date(config.get_string("data", "end_date").as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(invalid(
            "data",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, SharpefolioError> {
    match value {
        None => Err(missing("data", field)),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "data",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn validate_benchmark(config: &dyn ConfigPort) -> Result<(), SharpefolioError> {
    match config.get_string("portfolio", "benchmark") {
        Some(s) if s.trim().is_empty() => {
            Err(invalid("portfolio", "benchmark", "benchmark must not be empty"))
        }
        _ => Ok(()),
    }
}

/// Parses a key that is present, rejecting text that is not a number.
fn parsed<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, SharpefolioError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            invalid(section, key, format!("{} must be a number, got {:?}", key, raw))
        }),
    }
}

fn positive_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<(), SharpefolioError> {
    let value = parsed::<f64>(config, section, key)?.unwrap_or(default);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            section,
            key,
            format!("{} must be a finite positive number", key),
        ));
    }
    Ok(())
}

fn validate_capital(config: &dyn ConfigPort) -> Result<(), SharpefolioError> {
    positive_double(config, "portfolio", "capital", 100_000.0)
}

fn validate_trading_days(config: &dyn ConfigPort) -> Result<(), SharpefolioError> {
    positive_double(config, "portfolio", "trading_days", 252.0)
}

fn validate_min_weight(config: &dyn ConfigPort) -> Result<(), SharpefolioError> {
    let value = parsed::<f64>(config, "portfolio", "min_weight")?.unwrap_or(1e-4);
    // NaN fails the range check too.
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "portfolio",
            "min_weight",
            "min_weight must be in [0, 1)",
        ));
    }
    Ok(())
}

fn validate_optimizer(config: &dyn ConfigPort) -> Result<(), SharpefolioError> {
    let max_iterations = parsed::<i64>(config, "optimizer", "max_iterations")?.unwrap_or(10_000);
    if max_iterations <= 0 {
        return Err(invalid(
            "optimizer",
            "max_iterations",
            "max_iterations must be positive",
        ));
    }
    positive_double(config, "optimizer", "tolerance", 1e-9)
}
