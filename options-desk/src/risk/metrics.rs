//! Single-position risk metrics for a long option.
//!
//! Time is always in years. Callers that think in trading days go through
//! [`expected_move_trading_days`], which converts with 252 days per year.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{OptionSnapshot, OptionType, TRADING_DAYS_PER_YEAR};
use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, AnalyticsResult};

/// One-standard-deviation move of the underlying over `years`.
///
/// `spot * iv * sqrt(years)`
pub fn expected_move(spot: f64, implied_vol: f64, years: f64) -> AnalyticsResult<f64> {
    let spot = ensure_positive("spot", spot)?;
    let iv = ensure_non_negative("implied_vol", implied_vol)?;
    let years = ensure_non_negative("years", years)?;
    Ok(spot * iv * years.sqrt())
}

/// Expected move over a horizon given in trading days.
pub fn expected_move_trading_days(
    spot: f64,
    implied_vol: f64,
    trading_days: f64,
) -> AnalyticsResult<f64> {
    let days = ensure_non_negative("trading_days", trading_days)?;
    expected_move(spot, implied_vol, days / TRADING_DAYS_PER_YEAR)
}

/// Underlying price at expiry where the long option breaks even.
pub fn breakeven_price(premium: f64, strike: f64, option_type: OptionType) -> AnalyticsResult<f64> {
    let premium = ensure_non_negative("premium", premium)?;
    let strike = ensure_positive("strike", strike)?;
    Ok(match option_type {
        OptionType::Call => strike + premium,
        OptionType::Put => strike - premium,
    })
}

/// Worst case for a long option: the premium paid.
pub fn max_loss(premium: f64) -> AnalyticsResult<f64> {
    ensure_non_negative("premium", premium)
}

/// P&L of the long option if exercised at `spot` right now.
///
/// Intrinsic value minus the premium paid. A long call's upside is unbounded,
/// so this is a snapshot of the position, not its best case.
pub fn current_intrinsic_pnl(
    spot: f64,
    strike: f64,
    premium: f64,
    option_type: OptionType,
) -> AnalyticsResult<f64> {
    let spot = ensure_finite("spot", spot)?;
    let strike = ensure_positive("strike", strike)?;
    let premium = ensure_non_negative("premium", premium)?;
    let intrinsic = match option_type {
        OptionType::Call => (spot - strike).max(0.0),
        OptionType::Put => (strike - spot).max(0.0),
    };
    Ok(intrinsic - premium)
}

/// All single-position metrics for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRisk {
    pub expected_move: f64,
    pub breakeven: f64,
    pub max_loss: f64,
    pub intrinsic_pnl: f64,
}

impl PositionRisk {
    pub fn from_snapshot(snapshot: &OptionSnapshot) -> AnalyticsResult<Self> {
        let risk = Self {
            expected_move: expected_move(
                snapshot.spot,
                snapshot.implied_vol,
                snapshot.time_to_expiry,
            )?,
            breakeven: breakeven_price(snapshot.premium, snapshot.strike, snapshot.option_type)?,
            max_loss: max_loss(snapshot.premium)?,
            intrinsic_pnl: current_intrinsic_pnl(
                snapshot.spot,
                snapshot.strike,
                snapshot.premium,
                snapshot.option_type,
            )?,
        };
        debug!(?risk, "computed position risk");
        Ok(risk)
    }

    /// Distance from spot to breakeven as a percentage of spot.
    pub fn breakeven_distance_pct(&self, spot: f64) -> f64 {
        if spot > 0.0 {
            (self.breakeven - spot) / spot * 100.0
        } else {
            0.0
        }
    }

    /// Whether the breakeven lies within one expected move of spot.
    pub fn breakeven_within_expected_move(&self, spot: f64) -> bool {
        (self.breakeven - spot).abs() <= self.expected_move
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use approx::assert_relative_eq;

    #[test]
    fn test_expected_move() {
        // 100 * 0.252 * sqrt(0.25) = 12.6
        assert_relative_eq!(expected_move(100.0, 0.252, 0.25).unwrap(), 12.6, epsilon = 1e-12);
    }

    #[test]
    fn test_expected_move_units_agree() {
        let by_days = expected_move_trading_days(150.0, 0.3, 63.0).unwrap();
        let by_years = expected_move(150.0, 0.3, 63.0 / 252.0).unwrap();
        assert_relative_eq!(by_days, by_years, epsilon = 1e-12);
        assert_relative_eq!(by_days, 22.5, epsilon = 1e-12);
    }

    #[test]
    fn test_breakeven() {
        assert_eq!(breakeven_price(2.5, 100.0, OptionType::Call).unwrap(), 102.5);
        assert_eq!(breakeven_price(2.5, 100.0, OptionType::Put).unwrap(), 97.5);
    }

    #[test]
    fn test_max_loss_is_premium() {
        assert_eq!(max_loss(3.2).unwrap(), 3.2);
        assert!(max_loss(-1.0).is_err());
    }

    #[test]
    fn test_current_intrinsic_pnl() {
        assert_eq!(current_intrinsic_pnl(110.0, 100.0, 4.0, OptionType::Call).unwrap(), 6.0);
        assert_eq!(current_intrinsic_pnl(90.0, 100.0, 4.0, OptionType::Call).unwrap(), -4.0);
        assert_eq!(current_intrinsic_pnl(90.0, 100.0, 4.0, OptionType::Put).unwrap(), 6.0);
        assert_eq!(current_intrinsic_pnl(110.0, 100.0, 4.0, OptionType::Put).unwrap(), -4.0);
    }

    #[test]
    fn test_non_finite_inputs_rejected() {
        assert!(matches!(
            expected_move(f64::NAN, 0.2, 1.0),
            Err(AnalyticsError::Domain(_))
        ));
        assert!(breakeven_price(f64::INFINITY, 100.0, OptionType::Call).is_err());
        assert!(current_intrinsic_pnl(100.0, 100.0, f64::NAN, OptionType::Put).is_err());
        assert!(expected_move_trading_days(100.0, 0.2, -5.0).is_err());
    }

    #[test]
    fn test_position_risk_from_snapshot() {
        let snap =
            OptionSnapshot::new(105.0, 100.0, 0.25, 0.05, 0.2, OptionType::Call, 7.0).unwrap();
        let risk = PositionRisk::from_snapshot(&snap).unwrap();
        assert_relative_eq!(risk.expected_move, 10.5, epsilon = 1e-12);
        assert_eq!(risk.breakeven, 107.0);
        assert_eq!(risk.max_loss, 7.0);
        assert_eq!(risk.intrinsic_pnl, -2.0);
        assert!(risk.breakeven_within_expected_move(105.0));
        assert_relative_eq!(risk.breakeven_distance_pct(105.0), 2.0 / 105.0 * 100.0);
    }
}
