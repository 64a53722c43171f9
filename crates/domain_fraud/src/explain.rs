//! Claimant-facing alarm explanations

use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmSeverity, AlarmType};
use crate::config::RuleThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmExplanation {
    #[serde(rename = "type")]
    pub alarm_type: AlarmType,
    pub description: String,
    pub severity: AlarmSeverity,
    pub tips: Vec<String>,
}

/// Explanations rendered against the active thresholds
#[derive(Debug, Clone)]
pub struct AlarmCatalog {
    thresholds: RuleThresholds,
}

impl AlarmCatalog {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    /// Looks up an alarm type by identifier; `None` when unknown
    ///
    /// Also accepts the older `time_pattern_fraud` and
    /// `external_data_mismatch` identifiers.
    pub fn explain(&self, alarm_type: &str) -> Option<AlarmExplanation> {
        let normalized = alarm_type.trim().to_lowercase();
        let resolved = match normalized.as_str() {
            "time_pattern_fraud" => AlarmType::TimePattern,
            "external_data_mismatch" => AlarmType::ExternalMismatch,
            other => other.parse().ok()?,
        };
        Some(self.entry(resolved))
    }

    pub fn all(&self) -> Vec<AlarmExplanation> {
        AlarmType::ALL.iter().map(|t| self.entry(*t)).collect()
    }

    fn entry(&self, alarm_type: AlarmType) -> AlarmExplanation {
        let t = &self.thresholds;
        let (description, tip) = match alarm_type {
            AlarmType::LateReporting => (
                format!(
                    "This claim was reported more than {} days after the incident. Late reports can indicate made-up or delayed claims.",
                    t.late_report_days
                ),
                "Provide a police report or dated evidence of the incident.",
            ),
            AlarmType::NewBankAccount => (
                "The payout bank account is new or unverified. This could indicate identity issues.".to_string(),
                "Upload a recent bank statement or ID matching this account.",
            ),
            AlarmType::OutOfNetworkProvider => (
                "The provider is not in your approved network, which may trigger a manual review.".to_string(),
                "Attach referral letters or explain emergency circumstances.",
            ),
            AlarmType::BlacklistHit => (
                "The provider is on the fraud blacklist due to past overbilling or false claims.".to_string(),
                "Contact support for alternative verified providers.",
            ),
            AlarmType::SuspiciousTextPhrases => (
                "Notes include phrases associated with fraud such as 'quick cash' or 'staged accident'.".to_string(),
                "Use factual language and include receipts or witness details.",
            ),
            AlarmType::HighAmount => (
                format!(
                    "The claim amount exceeds the {} threshold or is well above your usual claims. Large claims need supporting documentation.",
                    t.high_amount_threshold
                ),
                "Attach receipts, photos, or invoices for verification.",
            ),
            AlarmType::RepeatClaimant => (
                format!(
                    "The claimant has filed {} or more claims recently. Frequent filings may trigger a review.",
                    t.repeat_claim_threshold
                ),
                "Include explanations or medical history for repeat cases.",
            ),
            AlarmType::SuspiciousKeywords => (
                "Specific keywords in the claim notes suggest exaggeration or inconsistencies.".to_string(),
                "Review and clarify your description using objective terms.",
            ),
            AlarmType::LocationMismatch => (
                format!(
                    "The incident location is more than {:.0} miles from your registered address.",
                    t.location_distance_threshold
                ),
                "Submit travel receipts or photos proving your presence there.",
            ),
            AlarmType::DuplicateClaims => (
                format!(
                    "The claim text is more than {:.0}% similar to a previous claim, which may indicate resubmission.",
                    t.similarity_threshold * 100.0
                ),
                "Reference the prior claim ID if this is a follow-up.",
            ),
            AlarmType::VendorFraud => (
                "This vendor has a high risk score due to previous suspicious activity.".to_string(),
                "Provide the vendor's certification or use an in-network provider.",
            ),
            AlarmType::TimePattern => (
                "The claim was filed at an unusual time (overnight, on a weekend, or right after another claim).".to_string(),
                "Add a note explaining why it was filed at this time.",
            ),
            AlarmType::ExternalMismatch => (
                "Claim details do not match external data, for example no rain at the location on the date of a slip.".to_string(),
                "Attach credible evidence such as weather or police reports.",
            ),
        };

        AlarmExplanation {
            alarm_type,
            description,
            severity: alarm_type.default_severity(),
            tips: vec![tip.to_string()],
        }
    }
}
