//! Checks that need nothing beyond the claim itself (and the text signal
//! for phrase merging)

use crate::alarm::{Alarm, AlarmType};
use crate::error::RuleError;

use super::{RuleCheck, RuleContext};

/// How many phrases an alarm description lists
const PHRASES_SHOWN: usize = 3;

pub struct LateReportingCheck;

impl RuleCheck for LateReportingCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::LateReporting
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        let delay = ctx.claim.report_delay_days;
        let limit = ctx.thresholds.late_report_days;
        if delay <= limit {
            return Ok(None);
        }
        Ok(Some(
            Alarm::new(
                AlarmType::LateReporting,
                format!("Claim reported {delay} days after the incident (limit {limit})"),
            )
            .with_evidence("report_delay_days", delay),
        ))
    }
}

pub struct NewBankAccountCheck;

impl RuleCheck for NewBankAccountCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::NewBankAccount
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        Ok(ctx.claim.is_new_bank.then(|| {
            Alarm::new(
                AlarmType::NewBankAccount,
                "Payout requested to a recently opened bank account",
            )
        }))
    }
}

pub struct OutOfNetworkCheck;

impl RuleCheck for OutOfNetworkCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::OutOfNetworkProvider
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        let provider = ctx.claim.provider_lower();
        if !(provider.contains("out-of-network") || provider.contains("non-network")) {
            return Ok(None);
        }
        Ok(Some(
            Alarm::new(
                AlarmType::OutOfNetworkProvider,
                format!("Provider {} is outside the approved network", ctx.claim.provider),
            )
            .with_evidence("provider", ctx.claim.provider.clone()),
        ))
    }
}

pub struct BlacklistCheck;

impl RuleCheck for BlacklistCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::BlacklistHit
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        let provider = ctx.claim.provider_lower();
        if provider.is_empty() {
            return Ok(None);
        }
        let hit = ctx
            .thresholds
            .blacklist
            .iter()
            .find(|entry| !entry.is_empty() && provider.contains(&entry.to_lowercase()));

        Ok(hit.map(|entry| {
            Alarm::new(
                AlarmType::BlacklistHit,
                format!("Provider {} matches blacklist entry {entry}", ctx.claim.provider),
            )
            .with_evidence("matched_entry", entry.clone())
        }))
    }
}

/// Configured phrases found verbatim in the notes, merged with the
/// analyzer's suspicious terms
pub struct SuspiciousPhrasesCheck;

impl RuleCheck for SuspiciousPhrasesCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::SuspiciousTextPhrases
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        let notes = ctx.claim.notes_lower();
        if notes.is_empty() {
            return Ok(None);
        }

        let mut phrases: Vec<String> = ctx
            .thresholds
            .suspicious_phrases
            .iter()
            .filter(|p| !p.is_empty() && notes.contains(&p.to_lowercase()))
            .cloned()
            .collect();
        if let Some(text) = &ctx.signals.text {
            for phrase in &text.suspicious_phrases {
                if !phrases.iter().any(|p| p.eq_ignore_ascii_case(phrase)) {
                    phrases.push(phrase.clone());
                }
            }
        }

        if phrases.is_empty() {
            return Ok(None);
        }
        let shown: Vec<&str> = phrases.iter().take(PHRASES_SHOWN).map(String::as_str).collect();
        Ok(Some(
            Alarm::new(
                AlarmType::SuspiciousTextPhrases,
                format!("Suspicious phrases in notes: {}", shown.join(", ")),
            )
            .with_evidence("phrases", phrases),
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

    fn run(check: &dyn RuleCheck, claim: &Claim, signals: &SignalSnapshot) -> Option<Alarm> {
        let thresholds = RuleThresholds::default();
        let history = ClaimantHistory::default();
        check
            .check(&RuleContext {
                claim,
                signals,
                history: &history,
                thresholds: &thresholds,
            })
            .unwrap()
    }

    fn claim() -> Claim {
        Claim::new("C-1", dec!(500)).unwrap()
    }

    #[test]
    fn test_late_reporting_boundary() {
        let signals = SignalSnapshot::default();
        assert!(run(&LateReportingCheck, &claim().with_report_delay(7), &signals).is_none());
        let alarm = run(&LateReportingCheck, &claim().with_report_delay(8), &signals).unwrap();
        assert!(alarm.description.contains("8 days"));
    }

    #[test]
    fn test_out_of_network_variants() {
        let signals = SignalSnapshot::default();
        assert!(run(&OutOfNetworkCheck, &claim().with_provider("Out-of-Network Clinic"), &signals).is_some());
        assert!(run(&OutOfNetworkCheck, &claim().with_provider("non-network lab"), &signals).is_some());
        assert!(run(&OutOfNetworkCheck, &claim().with_provider("City Hospital"), &signals).is_none());
    }

    #[test]
    fn test_blacklist_substring_match() {
        let alarm = run(
            &BlacklistCheck,
            &claim().with_provider("Downtown SHADY_CLINIC LLC"),
            &SignalSnapshot::default(),
        )
        .unwrap();
        assert_eq!(alarm.evidence["matched_entry"], "shady_clinic");
    }

    #[test]
    fn test_phrases_merge_analyzer_terms() {
        let signals = SignalSnapshot {
            text: Some(TextAnalysis {
                keyword_count: 1,
                suspicious_phrases: vec!["staged".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let alarm = run(
            &SuspiciousPhrasesCheck,
            &claim().with_notes("No witnesses, cash only please. It was staged."),
            &signals,
        )
        .unwrap();

        assert_eq!(
            alarm.description,
            "Suspicious phrases in notes: cash only, no witnesses, staged"
        );
    }
}
