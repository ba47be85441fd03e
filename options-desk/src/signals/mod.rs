//! Signal generation module.
//!
//! Converts a price series into long/short/flat signals via a simple
//! moving-average crossover (20 over 50 by default).

pub mod crossover;

pub use crossover::{
    compute_signals, simple_moving_average, CrossoverConfig, CrossoverRow, SmaCrossover,
};
