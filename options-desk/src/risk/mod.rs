//! Risk management module.
//!
//! Provides:
//! - Single-position risk metrics (expected move, breakeven, max loss,
//!   current intrinsic P&L)

pub mod metrics;

pub use metrics::{
    breakeven_price, current_intrinsic_pnl, expected_move, expected_move_trading_days, max_loss,
    PositionRisk,
};
