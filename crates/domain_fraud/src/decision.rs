//! Decision policy
//!
//! Fuses the probability and alarm severities into a decision:
//!
//! ```text
//! probability >= 0.75 or HIGH alarms >= 2  -> Reject
//! probability >= 0.30 or any alarm         -> Review
//! otherwise                                -> Approve
//! ```
//!
//! `decide` is a pure function of its inputs and thresholds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alarm::{high_severity_count, Alarm};
use crate::config::DecisionThresholds;

/// Alarms summarized in an explanation
const ALARMS_SUMMARIZED: usize = 3;
/// Characters of each alarm description kept in an explanation
const DESCRIPTION_CHARS: usize = 40;

pub const APPEAL_RECOMMENDATION: &str = "Submit supporting documents or appeal decision.";

/// Outcome of a scoring call, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Decision {
    Approve,
    Review,
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "Approve",
            Decision::Review => "Review",
            Decision::Reject => "Reject",
        }
    }

    fn outcome_message(&self) -> &'static str {
        match self {
            Decision::Reject => "High risk - claim rejected due to critical fraud indicators.",
            Decision::Review => "Moderate risk - claim requires manual review.",
            Decision::Approve => "Low risk - claim approved automatically.",
        }
    }

    /// Next step offered to the claimant, if any
    pub fn recommendation(&self) -> Option<&'static str> {
        match self {
            Decision::Approve => None,
            Decision::Review | Decision::Reject => Some(APPEAL_RECOMMENDATION),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse probability band reported alongside the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.7 {
            RiskLevel::High
        } else if probability > 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecisionPolicy {
    thresholds: DecisionThresholds,
}

impl DecisionPolicy {
    pub fn new(thresholds: DecisionThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(&self, probability: f64, alarms: &[Alarm]) -> Decision {
        let t = &self.thresholds;
        if probability >= t.reject_probability || high_severity_count(alarms) >= t.reject_high_count {
            Decision::Reject
        } else if probability >= t.review_probability || !alarms.is_empty() {
            Decision::Review
        } else {
            Decision::Approve
        }
    }

    /// Returns the decision and its templated explanation
    pub fn decide(&self, probability: f64, alarms: &[Alarm]) -> (Decision, String) {
        let decision = self.classify(probability, alarms);
        (decision, explain(probability, decision, alarms))
    }
}

fn explain(probability: f64, decision: Decision, alarms: &[Alarm]) -> String {
    let summaries: Vec<String> = alarms
        .iter()
        .take(ALARMS_SUMMARIZED)
        .map(|a| {
            let short: String = a.description.chars().take(DESCRIPTION_CHARS).collect();
            format!("{}: {short}...", a.alarm_type)
        })
        .collect();
    let summary = if summaries.is_empty() {
        "No alarms triggered".to_string()
    } else {
        summaries.join(", ")
    };

    format!(
        "Predicted fraud risk: {:.1}%. Decision: {decision}. Detected {} alarms ({summary}). {}",
        probability * 100.0,
        alarms.len(),
        decision.outcome_message()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::AlarmType;

    fn policy() -> DecisionPolicy {
        DecisionPolicy::default()
    }

    #[test]
    fn test_probability_thresholds() {
        assert_eq!(policy().classify(0.75, &[]), Decision::Reject);
        assert_eq!(policy().classify(0.7499, &[]), Decision::Review);
        assert_eq!(policy().classify(0.30, &[]), Decision::Review);
        assert_eq!(policy().classify(0.2999, &[]), Decision::Approve);
    }

    #[test]
    fn test_two_high_alarms_reject_at_low_probability() {
        let alarms = vec![
            Alarm::new(AlarmType::BlacklistHit, "a"),
            Alarm::new(AlarmType::VendorFraud, "b"),
        ];
        assert_eq!(policy().classify(0.01, &alarms), Decision::Reject);
    }

    #[test]
    fn test_any_alarm_forces_review() {
        let alarms = vec![Alarm::new(AlarmType::OutOfNetworkProvider, "low")];
        assert_eq!(policy().classify(0.0, &alarms), Decision::Review);
    }

    #[test]
    fn test_explanation_template() {
        let alarms = vec![
            Alarm::new(AlarmType::LateReporting, "Claim reported 12 days after the incident (limit 7)"),
            Alarm::new(AlarmType::NewBankAccount, "short"),
        ];
        let (decision, explanation) = policy().decide(0.42, &alarms);

        assert_eq!(decision, Decision::Review);
        assert_eq!(
            explanation,
            "Predicted fraud risk: 42.0%. Decision: Review. Detected 2 alarms \
             (late_reporting: Claim reported 12 days after the inciden..., new_bank_account: short...). \
             Moderate risk - claim requires manual review."
        );
    }

    #[test]
    fn test_explanation_without_alarms() {
        let (_, explanation) = policy().decide(0.05, &[]);
        assert!(explanation.contains("Detected 0 alarms (No alarms triggered)"));
        assert!(explanation.ends_with("Low risk - claim approved automatically."));
    }

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(RiskLevel::from_probability(0.3), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.31), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.71), RiskLevel::High);
    }

    #[test]
    fn test_recommendation_only_when_not_approved() {
        assert_eq!(Decision::Approve.recommendation(), None);
        assert_eq!(Decision::Reject.recommendation(), Some(APPEAL_RECOMMENDATION));
    }
}
