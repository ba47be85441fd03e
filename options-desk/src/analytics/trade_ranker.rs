//! Trade ranking by risk/reward.
//!
//! risk_reward = expected_gain / max_loss. Candidates are sorted best first;
//! equal scores keep their input order. A single candidate with a
//! non-positive max loss rejects the whole batch.

use serde::Serialize;
use tracing::{debug, warn};

use crate::data::{OptionSnapshot, TradeIdea};
use crate::error::{ensure_finite, AnalyticsError, AnalyticsResult};
use crate::risk::{current_intrinsic_pnl, max_loss};

impl TradeIdea {
    /// The idea the pipeline builds for one long option: the gain is the
    /// current intrinsic P&L and the loss is the premium paid.
    pub fn from_snapshot(id: &str, snapshot: &OptionSnapshot) -> AnalyticsResult<Self> {
        Ok(Self {
            id: id.to_string(),
            expected_gain: current_intrinsic_pnl(
                snapshot.spot,
                snapshot.strike,
                snapshot.premium,
                snapshot.option_type,
            )?,
            max_loss: max_loss(snapshot.premium)?,
            premium: snapshot.premium,
            strike: snapshot.strike,
            implied_volatility: snapshot.implied_vol,
        })
    }

    /// Expected gain per unit of max loss.
    pub fn risk_reward(&self) -> AnalyticsResult<f64> {
        let gain = ensure_finite("expected_gain", self.expected_gain)?;
        let loss = ensure_finite("max_loss", self.max_loss)?;
        if loss <= 0.0 {
            return Err(AnalyticsError::Domain(format!(
                "trade {} has max_loss {}; risk/reward needs max_loss > 0",
                self.id, loss
            )));
        }
        ensure_finite("risk_reward", gain / loss)
    }
}

/// A trade idea with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTrade {
    #[serde(flatten)]
    pub idea: TradeIdea,
    pub risk_reward: f64,
}

/// Rank ideas by risk/reward, highest first.
pub fn rank_trades(ideas: &[TradeIdea]) -> AnalyticsResult<Vec<RankedTrade>> {
    let mut ranked = ideas
        .iter()
        .map(|idea| {
            idea.risk_reward()
                .map(|risk_reward| RankedTrade {
                    idea: idea.clone(),
                    risk_reward,
                })
                .inspect_err(|e| warn!(trade = %idea.id, error = %e, "rejected trade idea"))
        })
        .collect::<AnalyticsResult<Vec<_>>>()?;

    // sort_by is stable, so ties stay in input order
    ranked.sort_by(|a, b| b.risk_reward.total_cmp(&a.risk_reward));

    debug!(
        count = ranked.len(),
        best = ?ranked.first().map(|t| (&t.idea.id, t.risk_reward)),
        "ranked trades"
    );
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::OptionType;

    fn idea(id: &str, gain: f64, loss: f64) -> TradeIdea {
        TradeIdea {
            id: id.to_string(),
            expected_gain: gain,
            max_loss: loss,
            premium: loss,
            strike: 100.0,
            implied_volatility: 0.3,
        }
    }

    #[test]
    fn test_rank_order() {
        let ranked = rank_trades(&[idea("a", 10.0, 5.0), idea("b", 20.0, 2.0), idea("c", 5.0, 5.0)])
            .unwrap();
        let order: Vec<_> = ranked.iter().map(|t| (t.idea.id.as_str(), t.risk_reward)).collect();
        assert_eq!(order, vec![("b", 10.0), ("a", 2.0), ("c", 1.0)]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank_trades(&[
            idea("first", 4.0, 2.0),
            idea("top", 9.0, 1.0),
            idea("second", 2.0, 1.0),
            idea("third", 6.0, 3.0),
        ])
        .unwrap();
        let ids: Vec<_> = ranked.iter().map(|t| t.idea.id.as_str()).collect();
        assert_eq!(ids, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_negative_scores_rank_last() {
        let ranked = rank_trades(&[idea("loser", -3.0, 3.0), idea("winner", 1.0, 4.0)]).unwrap();
        assert_eq!(ranked[0].idea.id, "winner");
        assert_eq!(ranked[1].risk_reward, -1.0);
    }

    #[test]
    fn test_non_positive_max_loss_rejected() {
        for loss in [0.0, -1.0] {
            let err = rank_trades(&[idea("ok", 1.0, 1.0), idea("bad", 1.0, loss)]).unwrap_err();
            assert!(matches!(err, AnalyticsError::Domain(_)));
            assert!(err.to_string().contains("bad"));
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(rank_trades(&[idea("nan", f64::NAN, 1.0)]).is_err());
        assert!(rank_trades(&[idea("inf", 1.0, f64::INFINITY)]).is_err());
    }

    #[test]
    fn test_overflowing_ratio_rejected() {
        let err = rank_trades(&[idea("ok", 1.0, 1.0), idea("tiny", 1.0, 1e-320)]).unwrap_err();
        assert!(matches!(err, AnalyticsError::Domain(_)));
        assert!(err.to_string().contains("risk_reward"));
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_trades(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_from_snapshot() {
        let snap =
            OptionSnapshot::new(110.0, 100.0, 0.5, 0.05, 0.25, OptionType::Call, 4.0).unwrap();
        let idea = TradeIdea::from_snapshot("AAPL", &snap).unwrap();
        assert_eq!(idea.expected_gain, 6.0);
        assert_eq!(idea.max_loss, 4.0);
        assert_eq!(idea.risk_reward().unwrap(), 1.5);
    }

    #[test]
    fn test_zero_premium_idea_cannot_rank() {
        let snap =
            OptionSnapshot::new(90.0, 100.0, 0.5, 0.05, 0.25, OptionType::Put, 0.0).unwrap();
        let idea = TradeIdea::from_snapshot("free", &snap).unwrap();
        assert!(rank_trades(&[idea]).is_err());
    }
}
