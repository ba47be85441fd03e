//! Error types shared by the analytics core.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// A numeric precondition was violated (non-positive volatility,
    /// non-finite input, non-positive max loss, ...).
    #[error("Domain error: {0}")]
    Domain(String),

    /// Price and signal series do not line up one-to-one.
    #[error("Alignment error: {0}")]
    Alignment(String),

    /// A price series is out of order or holds invalid prices.
    #[error("Invalid series: {0}")]
    InvalidSeries(String),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Reject non-finite values before they reach a formula.
pub(crate) fn ensure_finite(name: &str, value: f64) -> AnalyticsResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalyticsError::Domain(format!("{} must be finite, got {}", name, value)))
    }
}

/// Reject values that are non-finite or not strictly positive.
pub(crate) fn ensure_positive(name: &str, value: f64) -> AnalyticsResult<f64> {
    let value = ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(AnalyticsError::Domain(format!("{} must be > 0, got {}", name, value)))
    }
}

/// Reject values that are non-finite or negative.
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> AnalyticsResult<f64> {
    let value = ensure_finite(name, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(AnalyticsError::Domain(format!("{} must be >= 0, got {}", name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards() {
        assert_eq!(ensure_finite("x", 1.5), Ok(1.5));
        assert!(ensure_finite("x", f64::NAN).is_err());
        assert!(ensure_positive("x", 0.0).is_err());
        assert!(ensure_positive("x", f64::INFINITY).is_err());
        assert_eq!(ensure_non_negative("x", 0.0), Ok(0.0));
        assert!(ensure_non_negative("x", -0.01).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = AnalyticsError::Alignment("length 3 vs 4".to_string());
        assert_eq!(err.to_string(), "Alignment error: length 3 vs 4");
    }
}
