//! Core data types for the options desk.
//!
//! Price and signal series are ordered by date and immutable once built.
//! Option snapshots are validated on construction so downstream formulas
//! never see a value that would turn into NaN or infinity.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{
    ensure_finite, ensure_non_negative, ensure_positive, AnalyticsError, AnalyticsResult,
};

/// Calendar days used to convert days-to-expiry into years.
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

/// Trading days per year, used for expected-move and return annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" | "CALL" => Some(Self::Call),
            "P" | "PUT" => Some(Self::Put),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "C",
            Self::Put => "P",
        }
    }
}

/// A single closing price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Closing prices ordered by strictly increasing date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting unordered dates and non-positive prices.
    pub fn new(points: Vec<PricePoint>) -> AnalyticsResult<Self> {
        for (idx, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(AnalyticsError::InvalidSeries(format!(
                    "price at {} must be finite and > 0, got {}",
                    point.date, point.close
                )));
            }
            if idx > 0 && point.date <= points[idx - 1].date {
                return Err(AnalyticsError::InvalidSeries(format!(
                    "dates must be strictly increasing: {} follows {}",
                    point.date,
                    points[idx - 1].date
                )));
            }
        }
        Ok(Self { points })
    }

    /// Build a series of consecutive calendar days starting at `start`.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> AnalyticsResult<Self> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + Duration::days(i as i64),
                close,
            })
            .collect();
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Directional signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Long,
    Short,
    #[default]
    Flat,
}

impl Signal {
    /// +1, -1 or 0.
    pub fn value(&self) -> i8 {
        match self {
            Self::Long => 1,
            Self::Short => -1,
            Self::Flat => 0,
        }
    }

    /// Position size implied by the signal.
    pub fn exposure(&self) -> f64 {
        f64::from(self.value())
    }

    pub fn from_value(value: i8) -> Option<Self> {
        match value {
            1 => Some(Self::Long),
            -1 => Some(Self::Short),
            0 => Some(Self::Flat),
            _ => None,
        }
    }
}

/// A signal stamped with the date of the price it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub signal: Signal,
}

/// Signals aligned one-to-one with a price series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalSeries {
    points: Vec<SignalPoint>,
}

impl SignalSeries {
    pub fn new(points: Vec<SignalPoint>) -> Self {
        Self { points }
    }

    /// Pair each price date with a signal. Lengths must match.
    pub fn for_prices(prices: &PriceSeries, signals: &[Signal]) -> AnalyticsResult<Self> {
        if prices.len() != signals.len() {
            return Err(AnalyticsError::Alignment(format!(
                "{} signals for {} prices",
                signals.len(),
                prices.len()
            )));
        }
        let points = prices
            .dates()
            .zip(signals.iter())
            .map(|(date, &signal)| SignalPoint { date, signal })
            .collect();
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SignalPoint] {
        &self.points
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.points.iter().map(|p| p.signal).collect()
    }

    pub fn last(&self) -> Option<Signal> {
        self.points.last().map(|p| p.signal)
    }
}

/// Point-in-time inputs for pricing a single option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionSnapshot {
    /// Underlying spot price.
    pub spot: f64,
    /// Strike price.
    pub strike: f64,
    /// Time to expiry in years.
    pub time_to_expiry: f64,
    /// Annualized risk-free rate.
    pub rate: f64,
    /// Annualized implied volatility (0.25 = 25%).
    pub implied_vol: f64,
    pub option_type: OptionType,
    /// Last traded premium.
    pub premium: f64,
}

impl OptionSnapshot {
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        rate: f64,
        implied_vol: f64,
        option_type: OptionType,
        premium: f64,
    ) -> AnalyticsResult<Self> {
        Ok(Self {
            spot: ensure_positive("spot", spot)?,
            strike: ensure_positive("strike", strike)?,
            time_to_expiry: ensure_non_negative("time_to_expiry", time_to_expiry)?,
            rate: ensure_finite("rate", rate)?,
            implied_vol: ensure_positive("implied_vol", implied_vol)?,
            option_type,
            premium: ensure_non_negative("premium", premium)?,
        })
    }

    /// Build a snapshot from calendar days to expiry (days / 365).
    pub fn from_days_to_expiry(
        spot: f64,
        strike: f64,
        days_to_expiry: f64,
        rate: f64,
        implied_vol: f64,
        option_type: OptionType,
        premium: f64,
    ) -> AnalyticsResult<Self> {
        let days = ensure_non_negative("days_to_expiry", days_to_expiry)?;
        Self::new(
            spot,
            strike,
            days / CALENDAR_DAYS_PER_YEAR,
            rate,
            implied_vol,
            option_type,
            premium,
        )
    }
}

/// Black-Scholes sensitivities for one option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GreeksResult {
    pub delta: f64,
    /// Annualized time decay.
    pub theta: f64,
    /// Price change per 1.00 change in volatility.
    pub vega: f64,
}

impl GreeksResult {
    /// Theta per calendar day.
    pub fn theta_per_day(&self) -> f64 {
        self.theta / CALENDAR_DAYS_PER_YEAR
    }

    /// Vega per one volatility point (1%).
    pub fn vega_per_point(&self) -> f64 {
        self.vega / 100.0
    }
}

/// A candidate trade summarized for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIdea {
    pub id: String,
    pub expected_gain: f64,
    pub max_loss: f64,
    pub premium: f64,
    pub strike: f64,
    pub implied_volatility: f64,
}

/// One row of an option chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRow {
    pub strike: f64,
    pub option_type: OptionType,
    pub last_price: f64,
    pub implied_volatility: f64,
    pub volume: u64,
}
