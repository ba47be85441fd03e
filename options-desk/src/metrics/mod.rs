//! Performance metrics module.
//!
//! Provides backtest performance calculations:
//! - Total return, CAGR
//! - Sharpe ratio, Sortino ratio, Calmar ratio
//! - Maximum drawdown and recovery
//! - Exposure and per-bar statistics

pub mod calculator;

pub use calculator::{DrawdownAnalysis, MetricsCalculator, PerformanceMetrics};
