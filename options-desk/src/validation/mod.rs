//! Validation module for input series.
//!
//! This module provides:
//! - Price/signal alignment checks (length and dates)
//! - Price series integrity (history length, date gaps, price jumps)

pub mod alignment;
pub mod data_integrity;

pub use alignment::check_alignment;
pub use data_integrity::{CheckResult, DataIntegrityReport, DataIntegrityValidator};
