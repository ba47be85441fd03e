//! CSV loaders for the command-line entry point.
//!
//! The analytics core works on in-memory series; these helpers turn the
//! tables an external market-data fetch writes out into those series.
//!
//! Expected columns:
//! - prices: date (YYYY-MM-DD), close
//! - option chain: strike, option_type, last_price, implied_volatility, volume
//! - trade ideas: id, expected_gain, max_loss, premium, strike, implied_volatility

use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;

use super::types::{ChainRow, OptionType, PricePoint, PriceSeries, TradeIdea};

pub const PRICE_COLUMNS: &[&str] = &["date", "close"];

pub const CHAIN_COLUMNS: &[&str] = &[
    "strike",
    "option_type",
    "last_price",
    "implied_volatility",
    "volume",
];

pub const TRADE_COLUMNS: &[&str] = &[
    "id",
    "expected_gain",
    "max_loss",
    "premium",
    "strike",
    "implied_volatility",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn read_csv(path: &Path, required: &[&str]) -> Result<DataFrame, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::FileNotFound(path.display().to_string()));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let names = df.get_column_names();
    let missing: Vec<&str> = required
        .iter()
        .filter(|col| !names.contains(*col))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(LoaderError::InvalidData(format!(
            "{} is missing columns: {}",
            path.display(),
            missing.join(", ")
        )));
    }

    Ok(df)
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, LoaderError> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

fn str_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoaderError> {
    let series = df.column(name)?.cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect())
}

fn required<T>(value: Option<T>, column: &str, row: usize) -> Result<T, LoaderError> {
    value.ok_or_else(|| LoaderError::InvalidData(format!("row {}: missing {}", row, column)))
}

/// Load a `date,close` CSV into a validated price series.
pub fn load_prices_csv(path: impl AsRef<Path>) -> Result<PriceSeries, LoaderError> {
    let df = read_csv(path.as_ref(), PRICE_COLUMNS)?;
    let dates = str_column(&df, "date")?;
    let closes = f64_column(&df, "close")?;

    let mut points = Vec::with_capacity(df.height());
    for (row, (date, close)) in dates.into_iter().zip(closes).enumerate() {
        let date = required(date, "date", row)?;
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
            LoaderError::InvalidData(format!("row {}: bad date {:?}: {}", row, date, e))
        })?;
        points.push(PricePoint {
            date,
            close: required(close, "close", row)?,
        });
    }

    PriceSeries::new(points).map_err(|e| LoaderError::InvalidData(e.to_string()))
}

/// Load option chain rows. Missing volume counts as zero.
pub fn load_chain_csv(path: impl AsRef<Path>) -> Result<Vec<ChainRow>, LoaderError> {
    let df = read_csv(path.as_ref(), CHAIN_COLUMNS)?;
    let strikes = f64_column(&df, "strike")?;
    let types = str_column(&df, "option_type")?;
    let prices = f64_column(&df, "last_price")?;
    let ivs = f64_column(&df, "implied_volatility")?;
    let volumes = f64_column(&df, "volume")?;

    let mut rows = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let raw_type = required(types[row].clone(), "option_type", row)?;
        let option_type = OptionType::from_str(&raw_type).ok_or_else(|| {
            LoaderError::InvalidData(format!("row {}: unknown option type {:?}", row, raw_type))
        })?;
        rows.push(ChainRow {
            strike: required(strikes[row], "strike", row)?,
            option_type,
            last_price: prices[row].unwrap_or(0.0),
            implied_volatility: ivs[row].unwrap_or(f64::NAN),
            volume: volumes[row].filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0) as u64,
        });
    }
    Ok(rows)
}

/// Load trade ideas for ranking.
pub fn load_trades_csv(path: impl AsRef<Path>) -> Result<Vec<TradeIdea>, LoaderError> {
    let df = read_csv(path.as_ref(), TRADE_COLUMNS)?;
    let ids = str_column(&df, "id")?;
    let gains = f64_column(&df, "expected_gain")?;
    let losses = f64_column(&df, "max_loss")?;
    let premiums = f64_column(&df, "premium")?;
    let strikes = f64_column(&df, "strike")?;
    let ivs = f64_column(&df, "implied_volatility")?;

    (0..df.height())
        .map(|row| {
            Ok(TradeIdea {
                id: required(ids[row].clone(), "id", row)?,
                expected_gain: required(gains[row], "expected_gain", row)?,
                max_loss: required(losses[row], "max_loss", row)?,
                premium: premiums[row].unwrap_or(0.0),
                strike: strikes[row].unwrap_or(0.0),
                implied_volatility: ivs[row].unwrap_or(0.0),
            })
        })
        .collect()
}
