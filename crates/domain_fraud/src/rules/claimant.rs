//! Checks against the claimant's own history

use rust_decimal::Decimal;

use crate::alarm::{Alarm, AlarmType};
use crate::error::RuleError;

use super::{merge_findings, RuleCheck, RuleContext};

/// Absolute amount threshold, or a multiple of the claimant's average
///
/// The relative comparison is skipped when no average is known.
pub struct HighAmountCheck;

impl RuleCheck for HighAmountCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::HighAmount
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        let amount = ctx.claim.amount;
        let threshold = ctx.thresholds.high_amount_threshold;
        let mut findings = Vec::new();

        if amount > threshold {
            findings.push(format!("Amount {amount} exceeds the {threshold} threshold"));
        }

        let average = ctx.history.prior_amount_avg.filter(|avg| *avg > Decimal::ZERO);
        if let Some(avg) = average {
            let multiplier = ctx.thresholds.relative_amount_multiplier;
            let limit = avg.checked_mul(multiplier).ok_or_else(|| RuleError::InvalidValue {
                rule: "high_amount",
                message: format!("average {avg} x {multiplier} overflows"),
            })?;
            if amount > limit {
                findings.push(format!(
                    "Amount {amount} is more than {multiplier}x the claimant average of {}",
                    avg.round_dp(2)
                ));
            }
        }

        Ok(merge_findings(&findings).map(|description| {
            let mut alarm = Alarm::new(AlarmType::HighAmount, description)
                .with_evidence("amount", amount.to_string())
                .with_evidence("threshold", threshold.to_string());
            if let Some(avg) = average {
                alarm = alarm.with_evidence("claimant_average", avg.round_dp(2).to_string());
            }
            alarm
        }))
    }
}

pub struct RepeatClaimantCheck;

impl RuleCheck for RepeatClaimantCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::RepeatClaimant
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        let count = ctx.history.repeat_count;
        if count < ctx.thresholds.repeat_claim_threshold {
            return Ok(None);
        }
        Ok(Some(
            Alarm::new(
                AlarmType::RepeatClaimant,
                format!("Claimant has filed {count} claims within the history window"),
            )
            .with_evidence("prior_claims", count),
        ))
    }
}

/// Notes nearly identical to one of the claimant's previous claims
pub struct DuplicateClaimsCheck;

impl RuleCheck for DuplicateClaimsCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::DuplicateClaims
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        let Some(text) = &ctx.signals.text else {
            return Ok(None);
        };
        if ctx.history.prior_notes.is_empty() {
            return Ok(None);
        }
        let similarity = text.max_similarity;
        if !similarity.is_finite() {
            return Err(RuleError::InvalidValue {
                rule: "duplicate_claims",
                message: format!("similarity {similarity} is not finite"),
            });
        }
        if similarity <= ctx.thresholds.similarity_threshold {
            return Ok(None);
        }
        Ok(Some(
            Alarm::new(
                AlarmType::DuplicateClaims,
                format!(
                    "Notes are {:.0}% similar to a previous claim",
                    similarity * 100.0
                ),
            )
            .with_evidence("max_similarity", similarity),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::Claim;
    use crate::config::RuleThresholds;
    use crate::history::ClaimantHistory;
    use crate::signals::{SignalSnapshot, TextAnalysis};
    use rust_decimal_macros::dec;

    fn run(
        check: &dyn RuleCheck,
        claim: &Claim,
        signals: &SignalSnapshot,
        history: &ClaimantHistory,
    ) -> Result<Option<Alarm>, RuleError> {
        let thresholds = RuleThresholds::default();
        check.check(&RuleContext {
            claim,
            signals,
            history,
            thresholds: &thresholds,
        })
    }

    #[test]
    fn test_high_amount_absolute() {
        let claim = Claim::new("C-1", dec!(10000.01)).unwrap();
        let alarm = run(&HighAmountCheck, &claim, &SignalSnapshot::default(), &ClaimantHistory::default())
            .unwrap()
            .unwrap();
        assert!(alarm.is_high());

        let claim = Claim::new("C-1", dec!(10000)).unwrap();
        assert!(run(&HighAmountCheck, &claim, &SignalSnapshot::default(), &ClaimantHistory::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_high_amount_relative_merges_findings() {
        let history = ClaimantHistory {
            prior_amount_avg: Some(dec!(2000)),
            ..Default::default()
        };
        let claim = Claim::new("C-1", dec!(12000)).unwrap();
        let alarm = run(&HighAmountCheck, &claim, &SignalSnapshot::default(), &history)
            .unwrap()
            .unwrap();

        assert!(alarm.description.contains("threshold"));
        assert!(alarm.description.contains("3x the claimant average"));
        assert_eq!(alarm.evidence["claimant_average"], "2000");
    }

    #[test]
    fn test_high_amount_relative_only() {
        let history = ClaimantHistory {
            prior_amount_avg: Some(dec!(500)),
            ..Default::default()
        };
        let claim = Claim::new("C-1", dec!(1600)).unwrap();
        assert!(run(&HighAmountCheck, &claim, &SignalSnapshot::default(), &history)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_repeat_claimant_threshold() {
        let claim = Claim::new("C-1", dec!(100)).unwrap();
        let two = ClaimantHistory { repeat_count: 2, ..Default::default() };
        let three = ClaimantHistory { repeat_count: 3, ..Default::default() };

        assert!(run(&RepeatClaimantCheck, &claim, &SignalSnapshot::default(), &two).unwrap().is_none());
        assert!(run(&RepeatClaimantCheck, &claim, &SignalSnapshot::default(), &three).unwrap().is_some());
    }

    #[test]
    fn test_duplicate_requires_text_signal() {
        let claim = Claim::new("C-1", dec!(100)).unwrap();
        let history = ClaimantHistory {
            prior_notes: vec!["same notes as before".to_string()],
            ..Default::default()
        };
        assert!(run(&DuplicateClaimsCheck, &claim, &SignalSnapshot::default(), &history)
            .unwrap()
            .is_none());

        let signals = SignalSnapshot {
            text: Some(TextAnalysis { max_similarity: 0.93, ..Default::default() }),
            ..Default::default()
        };
        let alarm = run(&DuplicateClaimsCheck, &claim, &signals, &history).unwrap().unwrap();
        assert_eq!(alarm.description, "Notes are 93% similar to a previous claim");
    }

    #[test]
    fn test_duplicate_rejects_nan() {
        let claim = Claim::new("C-1", dec!(100)).unwrap();
        let history = ClaimantHistory {
            prior_notes: vec!["x".repeat(20)],
            ..Default::default()
        };
        let signals = SignalSnapshot {
            text: Some(TextAnalysis { max_similarity: f64::NAN, ..Default::default() }),
            ..Default::default()
        };
        assert!(run(&DuplicateClaimsCheck, &claim, &signals, &history).is_err());
    }
}
