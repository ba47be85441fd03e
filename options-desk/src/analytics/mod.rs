//! Options analytics module.
//!
//! Provides:
//! - Trade ranking by risk/reward
//! - Option-chain flow summaries and volume anomaly detection
//! - Realized volatility features

pub mod options_flow;
pub mod trade_ranker;
pub mod volatility;

pub use options_flow::{detect_volume_anomalies, FlowSummary, VolumeAnomalyDetector, VolumeReading};
pub use trade_ranker::{rank_trades, RankedTrade};
pub use volatility::{pct_returns, rolling_volatility, volatility_features, VolatilityFeature};
