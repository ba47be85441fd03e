pub mod analytics;
pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod pricing;
pub mod risk;
pub mod signals;
pub mod validation;

// Re-export commonly used types
pub use analytics::{rank_trades, FlowSummary, RankedTrade, VolumeAnomalyDetector};
pub use backtest::{simple_backtest, BacktestConfig, BacktestEngine, BacktestResult, PortfolioSeries};
pub use config::DeskConfig;
pub use data::{
    GreeksResult, OptionSnapshot, OptionType, PriceSeries, Signal, SignalSeries, TradeIdea,
};
pub use error::{AnalyticsError, AnalyticsResult};
pub use metrics::{MetricsCalculator, PerformanceMetrics};
pub use pricing::{black_scholes_greeks, BlackScholes};
pub use risk::PositionRisk;
pub use signals::{compute_signals, SmaCrossover};
