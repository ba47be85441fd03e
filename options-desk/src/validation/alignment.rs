//! Alignment checks between price and signal series.

use crate::data::{PriceSeries, SignalSeries};
use crate::error::{AnalyticsError, AnalyticsResult};

/// Require the two series to have the same length and the same date at
/// every index.
pub fn check_alignment(prices: &PriceSeries, signals: &SignalSeries) -> AnalyticsResult<()> {
    if prices.len() != signals.len() {
        return Err(AnalyticsError::Alignment(format!(
            "price series has {} bars but signal series has {}",
            prices.len(),
            signals.len()
        )));
    }

    let mismatch = prices
        .points()
        .iter()
        .zip(signals.points())
        .enumerate()
        .find(|(_, (price, signal))| price.date != signal.date);

    if let Some((idx, (price, signal))) = mismatch {
        return Err(AnalyticsError::Alignment(format!(
            "date mismatch at index {}: price {} vs signal {}",
            idx, price.date, signal.date
        )));
    }

    Ok(())
}
