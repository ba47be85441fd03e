//! Backtesting engine for crossover signals.
//!
//! This module provides:
//! - One-bar signal lag (no look-ahead)
//! - Percent-return compounding from an initial capital
//! - Long/short/flat exposure accounting

pub mod engine;

pub use engine::{
    simple_backtest, BacktestConfig, BacktestEngine, BacktestResult, EquityPoint, PortfolioSeries,
};
