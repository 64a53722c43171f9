//! Rule evaluation
//!
//! A fixed, ordered list of independent alarm checks. Each check sees the
//! claim, the collected signals and the claimant history, and yields at most
//! one alarm. A failing check is logged and contributes nothing; it never
//! stops the remaining checks.
//!
//! # Evaluation order
//!
//! ```text
//! late_reporting -> new_bank_account -> out_of_network_provider -> blacklist_hit
//!   -> suspicious_text_phrases -> high_amount -> repeat_claimant
//!   -> suspicious_keywords -> location_mismatch -> duplicate_claims
//!   -> vendor_fraud -> time_pattern -> external_mismatch
//! ```

mod claimant;
mod external;
mod legacy;
mod time_pattern;

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::alarm::{Alarm, AlarmType};
use crate::claim::Claim;
use crate::config::RuleThresholds;
use crate::error::RuleError;
use crate::history::ClaimantHistory;
use crate::signals::SignalSnapshot;

pub use claimant::{DuplicateClaimsCheck, HighAmountCheck, RepeatClaimantCheck};
pub use external::{ExternalMismatchCheck, LocationMismatchCheck, SuspiciousKeywordsCheck, VendorFraudCheck};
pub use legacy::{
    BlacklistCheck, LateReportingCheck, NewBankAccountCheck, OutOfNetworkCheck,
    SuspiciousPhrasesCheck,
};
pub use time_pattern::TimePatternCheck;

/// Inputs available to every check
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub claim: &'a Claim,
    pub signals: &'a SignalSnapshot,
    pub history: &'a ClaimantHistory,
    pub thresholds: &'a RuleThresholds,
}

/// A single alarm check
pub trait RuleCheck: Send + Sync {
    /// The alarm type this check may raise
    fn alarm_type(&self) -> AlarmType;

    /// `Ok(None)` when the check does not fire or its inputs are unavailable
    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError>;
}

/// Runs the configured checks in order
pub struct RuleEvaluator {
    checks: Vec<Box<dyn RuleCheck>>,
    thresholds: RuleThresholds,
}

impl RuleEvaluator {
    /// The standard 13-check pipeline
    pub fn standard(thresholds: RuleThresholds) -> Self {
        let checks: Vec<Box<dyn RuleCheck>> = vec![
            Box::new(LateReportingCheck),
            Box::new(NewBankAccountCheck),
            Box::new(OutOfNetworkCheck),
            Box::new(BlacklistCheck),
            Box::new(SuspiciousPhrasesCheck),
            Box::new(HighAmountCheck),
            Box::new(RepeatClaimantCheck),
            Box::new(SuspiciousKeywordsCheck),
            Box::new(LocationMismatchCheck),
            Box::new(DuplicateClaimsCheck),
            Box::new(VendorFraudCheck),
            Box::new(TimePatternCheck),
            Box::new(ExternalMismatchCheck),
        ];
        Self::with_checks(checks, thresholds)
    }

    pub fn with_checks(checks: Vec<Box<dyn RuleCheck>>, thresholds: RuleThresholds) -> Self {
        Self { checks, thresholds }
    }

    /// Alarm types in evaluation order
    pub fn alarm_types(&self) -> Vec<AlarmType> {
        self.checks.iter().map(|c| c.alarm_type()).collect()
    }

    /// Evaluates every check, returning alarms in evaluation order
    pub fn evaluate(
        &self,
        claim: &Claim,
        signals: &SignalSnapshot,
        history: &ClaimantHistory,
    ) -> Vec<Alarm> {
        let ctx = RuleContext {
            claim,
            signals,
            history,
            thresholds: &self.thresholds,
        };
        let mut seen = HashSet::new();
        let mut alarms = Vec::new();

        for check in &self.checks {
            match check.check(&ctx) {
                Ok(Some(alarm)) => {
                    if seen.insert(alarm.alarm_type) {
                        debug!(
                            claimant_id = %claim.claimant_id,
                            alarm_type = %alarm.alarm_type,
                            severity = %alarm.severity,
                            "Alarm raised"
                        );
                        alarms.push(alarm);
                    } else {
                        debug!(alarm_type = %alarm.alarm_type, "Duplicate alarm type dropped");
                    }
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        claimant_id = %claim.claimant_id,
                        rule = %check.alarm_type(),
                        error = %error,
                        "Rule check failed, treating as no alarm"
                    );
                }
            }
        }

        alarms
    }
}

/// Joins findings of a multi-finding check into one description
pub(crate) fn merge_findings(findings: &[String]) -> Option<String> {
    if findings.is_empty() {
        None
    } else {
        Some(findings.join("; "))
    }
}
