//! Simple moving-average crossover signals.
//!
//! Long while the short SMA is above the long SMA, short while it is below,
//! flat when they are equal or during warm-up when either average is not yet
//! defined. The signal at bar i only looks at closes up to bar i.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{PriceSeries, Signal, SignalPoint, SignalSeries};
use crate::error::{AnalyticsError, AnalyticsResult};

/// Window lengths for the crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossoverConfig {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
        }
    }
}

/// Trailing mean over `window` values; `None` until `window` values are seen.
///
/// Each window is averaged from its own slice, and a window of identical
/// values returns that value exactly, so equal averages compare equal.
pub fn simple_moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let first = slice[0];
            if slice.iter().all(|&v| v == first) {
                return Some(first);
            }
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// One bar of crossover output, with the averages that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossoverRow {
    pub date: NaiveDate,
    pub price: f64,
    pub short_sma: Option<f64>,
    pub long_sma: Option<f64>,
    pub signal: Signal,
}

/// Moving-average crossover signal generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmaCrossover {
    config: CrossoverConfig,
}

impl SmaCrossover {
    pub fn new(config: CrossoverConfig) -> AnalyticsResult<Self> {
        if config.short_window == 0 || config.long_window == 0 {
            return Err(AnalyticsError::Domain(
                "moving-average windows must be > 0".to_string(),
            ));
        }
        if config.short_window >= config.long_window {
            return Err(AnalyticsError::Domain(format!(
                "short window {} must be shorter than long window {}",
                config.short_window, config.long_window
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &CrossoverConfig {
        &self.config
    }

    /// Direction implied by a pair of averages.
    pub fn signal_for(short_sma: Option<f64>, long_sma: Option<f64>) -> Signal {
        match (short_sma, long_sma) {
            (Some(short), Some(long)) if short > long => Signal::Long,
            (Some(short), Some(long)) if short < long => Signal::Short,
            _ => Signal::Flat,
        }
    }

    /// Per-bar averages and signals.
    pub fn rows(&self, prices: &PriceSeries) -> Vec<CrossoverRow> {
        let closes = prices.closes();
        let short = simple_moving_average(&closes, self.config.short_window);
        let long = simple_moving_average(&closes, self.config.long_window);

        prices
            .points()
            .iter()
            .zip(short.into_iter().zip(long))
            .map(|(point, (short_sma, long_sma))| CrossoverRow {
                date: point.date,
                price: point.close,
                short_sma,
                long_sma,
                signal: Self::signal_for(short_sma, long_sma),
            })
            .collect()
    }

    /// Signals aligned with `prices`. Empty input gives an empty series.
    pub fn generate(&self, prices: &PriceSeries) -> SignalSeries {
        let points: Vec<SignalPoint> = self
            .rows(prices)
            .into_iter()
            .map(|row| SignalPoint {
                date: row.date,
                signal: row.signal,
            })
            .collect();

        debug!(
            bars = points.len(),
            short_window = self.config.short_window,
            long_window = self.config.long_window,
            last = ?points.last().map(|p| p.signal),
            "generated crossover signals"
        );
        SignalSeries::new(points)
    }
}

/// 20/50 crossover signals for `prices`.
pub fn compute_signals(prices: &PriceSeries) -> SignalSeries {
    SmaCrossover::default().generate(prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(start(), closes).unwrap()
    }

    #[test]
    fn test_sma_warmup_and_values() {
        let sma = simple_moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(sma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_sma_zero_window() {
        assert_eq!(simple_moving_average(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn test_invalid_windows() {
        assert!(SmaCrossover::new(CrossoverConfig { short_window: 0, long_window: 50 }).is_err());
        assert!(SmaCrossover::new(CrossoverConfig { short_window: 50, long_window: 20 }).is_err());
        assert!(SmaCrossover::new(CrossoverConfig { short_window: 20, long_window: 20 }).is_err());
    }

    #[test]
    fn test_empty_series() {
        let signals = compute_signals(&PriceSeries::default());
        assert!(signals.is_empty());
    }

    #[test]
    fn test_warmup_is_flat() {
        let closes: Vec<f64> = (1..=49).map(|i| 100.0 + i as f64).collect();
        let signals = compute_signals(&series(&closes));
        assert_eq!(signals.len(), 49);
        assert!(signals.signals().iter().all(|s| *s == Signal::Flat));
    }

    #[test]
    fn test_increasing_series_goes_and_stays_long() {
        let closes: Vec<f64> = (0..120).map(|i| 50.0 + i as f64).collect();
        let signals = compute_signals(&series(&closes)).signals();

        // First bar with both averages defined is index 49
        assert!(signals[..49].iter().all(|s| *s == Signal::Flat));
        assert!(signals[49..].iter().all(|s| *s == Signal::Long));
    }

    #[test]
    fn test_decreasing_series_goes_short() {
        let closes: Vec<f64> = (0..80).map(|i| 200.0 - i as f64).collect();
        let signals = compute_signals(&series(&closes));
        assert_eq!(signals.last(), Some(Signal::Short));
    }

    #[test]
    fn test_constant_series_is_flat() {
        let signals = compute_signals(&series(&[100.0; 75]));
        assert!(signals.signals().iter().all(|s| *s == Signal::Flat));
    }

    #[test]
    fn test_plateau_after_noise_is_flat() {
        let mut closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + ((i as f64) * 0.7).sin() * 3.0 + (i % 7) as f64 * 0.13)
            .collect();
        closes.extend(std::iter::repeat(101.37).take(80));

        let rows = SmaCrossover::default().rows(&series(&closes));
        // Both windows sit fully on the plateau from index 60 + 49
        for row in &rows[109..] {
            assert_eq!(row.short_sma, Some(101.37));
            assert_eq!(row.long_sma, Some(101.37));
            assert_eq!(row.signal, Signal::Flat);
        }
    }

    #[test]
    fn test_no_look_ahead() {
        let closes: Vec<f64> = (0..90).map(|i| 100.0 + ((i as f64) * 0.3).sin() * 10.0).collect();
        let full = compute_signals(&series(&closes)).signals();
        let prefix = compute_signals(&series(&closes[..60])).signals();
        assert_eq!(&full[..60], &prefix[..]);
    }

    #[test]
    fn test_custom_windows_and_rows() {
        let crossover = SmaCrossover::new(CrossoverConfig { short_window: 2, long_window: 3 }).unwrap();
        let rows = crossover.rows(&series(&[10.0, 11.0, 12.0, 9.0]));
        assert_eq!(rows[1].signal, Signal::Flat);
        assert_eq!(rows[2].short_sma, Some(11.5));
        assert_eq!(rows[2].long_sma, Some(11.0));
        assert_eq!(rows[2].signal, Signal::Long);
        // short = 10.5, long = 10.666..
        assert_eq!(rows[3].signal, Signal::Short);
    }

    #[test]
    fn test_signal_dates_match_prices() {
        let prices = series(&[1.0, 2.0, 3.0]);
        let signals = compute_signals(&prices);
        let dates: Vec<_> = signals.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, prices.dates().collect::<Vec<_>>());
    }
}
