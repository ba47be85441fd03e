//! Option-chain flow summary and volume anomaly detection.
//!
//! Summarizes call/put activity for a strike band and flags days whose total
//! volume sits far outside its trailing history:
//! - Call/put ratio: call volume / put volume (1.0 when no puts traded)
//! - IV skew: mean call IV - mean put IV
//! - Anomaly: |z| >= 2.5 against the last 30 observations

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::{ChainRow, OptionType};

/// Activity within a strike band of one option chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub min_strike: f64,
    pub max_strike: f64,
    pub call_volume: u64,
    pub put_volume: u64,
    pub total_volume: u64,
    /// Mean call IV in the band, if any calls are listed.
    pub call_iv: Option<f64>,
    pub put_iv: Option<f64>,
    /// Call IV minus put IV; only when both sides have an IV.
    pub iv_skew: Option<f64>,
    pub call_put_ratio: f64,
}

impl FlowSummary {
    /// Summarize rows whose strike lies in `[min_strike, max_strike]`.
    pub fn from_chain(rows: &[ChainRow], min_strike: f64, max_strike: f64) -> Self {
        let in_band = |row: &&ChainRow| row.strike >= min_strike && row.strike <= max_strike;
        let calls: Vec<&ChainRow> = rows
            .iter()
            .filter(in_band)
            .filter(|r| r.option_type == OptionType::Call)
            .collect();
        let puts: Vec<&ChainRow> = rows
            .iter()
            .filter(in_band)
            .filter(|r| r.option_type == OptionType::Put)
            .collect();

        let call_volume: u64 = calls.iter().map(|r| r.volume).sum();
        let put_volume: u64 = puts.iter().map(|r| r.volume).sum();
        let call_put_ratio = if put_volume > 0 {
            call_volume as f64 / put_volume as f64
        } else {
            1.0
        };

        let call_iv = Self::mean_iv(&calls);
        let put_iv = Self::mean_iv(&puts);

        Self {
            min_strike,
            max_strike,
            call_volume,
            put_volume,
            total_volume: call_volume + put_volume,
            call_iv,
            put_iv,
            iv_skew: call_iv.zip(put_iv).map(|(c, p)| c - p),
            call_put_ratio,
        }
    }

    fn mean_iv(rows: &[&ChainRow]) -> Option<f64> {
        let ivs: Vec<f64> = rows
            .iter()
            .map(|r| r.implied_volatility)
            .filter(|iv| iv.is_finite())
            .collect();
        if ivs.is_empty() {
            return None;
        }
        Some(ivs.iter().sum::<f64>() / ivs.len() as f64)
    }

    /// Whether calls dominate the band.
    pub fn is_call_heavy(&self) -> bool {
        self.call_put_ratio > 1.0
    }
}

/// Outcome of recording one volume observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeReading {
    pub volume: f64,
    pub z_score: Option<f64>,
    pub is_anomaly: bool,
}

/// Trailing-window volume z-score detector.
#[derive(Debug, Clone)]
pub struct VolumeAnomalyDetector {
    window: usize,
    z_threshold: f64,
    history: VecDeque<f64>,
}

impl Default for VolumeAnomalyDetector {
    fn default() -> Self {
        Self::new(30, 2.5)
    }
}

impl VolumeAnomalyDetector {
    pub fn new(window: usize, z_threshold: f64) -> Self {
        let window = window.max(2);
        Self {
            window,
            z_threshold,
            history: VecDeque::with_capacity(window),
        }
    }

    /// Record a volume and score it against the window it now belongs to.
    pub fn record(&mut self, volume: f64) -> VolumeReading {
        if !volume.is_finite() || volume < 0.0 {
            warn!(volume, "ignoring invalid volume observation");
            return VolumeReading {
                volume,
                z_score: None,
                is_anomaly: false,
            };
        }

        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(volume);

        let z_score = self.zscore(volume);
        VolumeReading {
            volume,
            z_score,
            is_anomaly: z_score.is_some_and(|z| z.abs() >= self.z_threshold),
        }
    }

    /// Population z-score of `value` against the current window.
    pub fn zscore(&self, value: f64) -> Option<f64> {
        if self.history.len() < 2 {
            return None;
        }

        let n = self.history.len() as f64;
        let mean = self.history.iter().sum::<f64>() / n;
        let variance = self.history.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        if std_dev == 0.0 {
            return None;
        }

        Some((value - mean) / std_dev)
    }

    pub fn history_length(&self) -> usize {
        self.history.len()
    }
}

/// Score every observation of a volume history in order.
pub fn detect_volume_anomalies(
    volumes: &[f64],
    window: usize,
    z_threshold: f64,
) -> Vec<VolumeReading> {
    let mut detector = VolumeAnomalyDetector::new(window, z_threshold);
    volumes.iter().map(|&v| detector.record(v)).collect()
}
