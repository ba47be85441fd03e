//! Realized volatility features.
//!
//! Rolling standard deviation of percent returns, the price/volatility pair
//! used as input for downstream clustering.

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::PriceSeries;

/// Percent change from the previous close; `None` for the first bar.
pub fn pct_returns(prices: &PriceSeries) -> Vec<Option<f64>> {
    let points = prices.points();
    (0..points.len())
        .map(|i| {
            if i == 0 {
                None
            } else {
                Some(points[i].close / points[i - 1].close - 1.0)
            }
        })
        .collect()
}

/// Sample standard deviation (n - 1) of the last `window` returns.
///
/// Defined from index `window` onward, since the first bar has no return.
/// A window below 2 has no sample deviation and yields all `None`.
pub fn rolling_volatility(prices: &PriceSeries, window: usize) -> Vec<Option<f64>> {
    let returns = pct_returns(prices);
    if window < 2 {
        return vec![None; returns.len()];
    }

    (0..returns.len())
        .map(|i| {
            if i < window {
                return None;
            }
            let slice: Vec<f64> = returns[i + 1 - window..=i].iter().flatten().copied().collect();
            let n = slice.len() as f64;
            let mean = slice.iter().sum::<f64>() / n;
            let variance = slice.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Some(variance.sqrt())
        })
        .collect()
}

/// One row of the price/volatility feature table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolatilityFeature {
    pub date: NaiveDate,
    pub close: f64,
    pub volatility: f64,
}

/// Close and rolling volatility for every bar where the volatility exists.
pub fn volatility_features(prices: &PriceSeries, window: usize) -> Vec<VolatilityFeature> {
    prices
        .points()
        .iter()
        .zip(rolling_volatility(prices, window))
        .filter_map(|(point, vol)| {
            vol.map(|volatility| VolatilityFeature {
                date: point.date,
                close: point.close,
                volatility,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(), closes).unwrap()
    }

    #[test]
    fn test_pct_returns() {
        let returns = pct_returns(&series(&[100.0, 110.0, 99.0]));
        assert_eq!(returns[0], None);
        assert_relative_eq!(returns[1].unwrap(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns[2].unwrap(), -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_rolling_volatility_warmup() {
        let vols = rolling_volatility(&series(&[100.0, 110.0, 99.0, 108.9]), 2);
        assert_eq!(vols[0], None);
        assert_eq!(vols[1], None);
        // returns +10%, -10%: sample std = sqrt(0.02)
        assert_relative_eq!(vols[2].unwrap(), 0.02_f64.sqrt(), epsilon = 1e-9);
        assert!(vols[3].is_some());
    }

    #[test]
    fn test_constant_growth_has_zero_volatility() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 * 2.0_f64.powi(i)).collect();
        let vols = rolling_volatility(&series(&closes), 10);
        assert_eq!(vols.iter().filter(|v| v.is_some()).count(), 5);
        assert!(vols.iter().flatten().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_small_window() {
        assert!(rolling_volatility(&series(&[1.0, 2.0, 3.0]), 1).iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_features_skip_warmup() {
        let closes: Vec<f64> = (0..12).map(|i| 100.0 + (i % 2) as f64).collect();
        let features = volatility_features(&series(&closes), 10);
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].close, closes[10]);
        assert!(features[0].volatility > 0.0);
    }
}
