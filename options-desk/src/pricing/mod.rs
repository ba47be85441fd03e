//! Option pricing analytics.
//!
//! Closed-form Black-Scholes prices and Greeks, plus implied volatility.

pub mod black_scholes;

pub use black_scholes::{black_scholes_greeks, BlackScholes};
