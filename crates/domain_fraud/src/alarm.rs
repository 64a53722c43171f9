//! Alarms raised by rule checks
//!
//! An alarm is created fresh for each scoring run and never mutated. The
//! `type` identifiers are part of the public contract: clients key their
//! explanations and dashboards on them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FraudError;

/// Alarm severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSeverity {
    Low,
    Medium,
    High,
}

impl AlarmSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmSeverity::Low => "low",
            AlarmSeverity::Medium => "medium",
            AlarmSeverity::High => "high",
        }
    }
}

impl fmt::Display for AlarmSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable alarm type identifiers, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmType {
    LateReporting,
    NewBankAccount,
    OutOfNetworkProvider,
    BlacklistHit,
    SuspiciousTextPhrases,
    HighAmount,
    RepeatClaimant,
    SuspiciousKeywords,
    LocationMismatch,
    DuplicateClaims,
    VendorFraud,
    TimePattern,
    ExternalMismatch,
}

impl AlarmType {
    pub const ALL: [AlarmType; 13] = [
        AlarmType::LateReporting,
        AlarmType::NewBankAccount,
        AlarmType::OutOfNetworkProvider,
        AlarmType::BlacklistHit,
        AlarmType::SuspiciousTextPhrases,
        AlarmType::HighAmount,
        AlarmType::RepeatClaimant,
        AlarmType::SuspiciousKeywords,
        AlarmType::LocationMismatch,
        AlarmType::DuplicateClaims,
        AlarmType::VendorFraud,
        AlarmType::TimePattern,
        AlarmType::ExternalMismatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmType::LateReporting => "late_reporting",
            AlarmType::NewBankAccount => "new_bank_account",
            AlarmType::OutOfNetworkProvider => "out_of_network_provider",
            AlarmType::BlacklistHit => "blacklist_hit",
            AlarmType::SuspiciousTextPhrases => "suspicious_text_phrases",
            AlarmType::HighAmount => "high_amount",
            AlarmType::RepeatClaimant => "repeat_claimant",
            AlarmType::SuspiciousKeywords => "suspicious_keywords",
            AlarmType::LocationMismatch => "location_mismatch",
            AlarmType::DuplicateClaims => "duplicate_claims",
            AlarmType::VendorFraud => "vendor_fraud",
            AlarmType::TimePattern => "time_pattern",
            AlarmType::ExternalMismatch => "external_mismatch",
        }
    }

    /// Severity assigned when this check fires
    pub fn default_severity(&self) -> AlarmSeverity {
        match self {
            AlarmType::OutOfNetworkProvider => AlarmSeverity::Low,
            AlarmType::BlacklistHit
            | AlarmType::HighAmount
            | AlarmType::DuplicateClaims
            | AlarmType::VendorFraud
            | AlarmType::ExternalMismatch => AlarmSeverity::High,
            _ => AlarmSeverity::Medium,
        }
    }
}

impl fmt::Display for AlarmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlarmType {
    type Err = FraudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        AlarmType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| FraudError::UnknownAlarmType(s.to_string()))
    }
}

/// A single fraud indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    #[serde(rename = "type")]
    pub alarm_type: AlarmType,
    pub description: String,
    pub severity: AlarmSeverity,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub evidence: BTreeMap<String, serde_json::Value>,
}

impl Alarm {
    /// Creates an alarm with the type's default severity
    pub fn new(alarm_type: AlarmType, description: impl Into<String>) -> Self {
        Self {
            alarm_type,
            description: description.into(),
            severity: alarm_type.default_severity(),
            evidence: BTreeMap::new(),
        }
    }

    pub fn with_evidence(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.evidence.insert(key.into(), value.into());
        self
    }

    pub fn is_high(&self) -> bool {
        self.severity == AlarmSeverity::High
    }
}

/// Counts HIGH severity alarms
pub fn high_severity_count(alarms: &[Alarm]) -> usize {
    alarms.iter().filter(|a| a.is_high()).count()
}
