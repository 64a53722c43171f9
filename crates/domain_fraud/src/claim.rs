//! Claim under assessment

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;
use crate::error::FraudError;

/// Notes longer than this are truncated at ingest
pub const MAX_NOTES_CHARS: usize = 5000;

/// A claim submitted for fraud scoring
///
/// The engine only ever borrows a claim; re-submitting the same claim is a
/// new scoring event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: ClaimId,
    pub claimant_id: String,
    pub amount: Decimal,
    /// Days between the incident and the report
    pub report_delay_days: u32,
    pub provider: String,
    pub notes: String,
    /// Incident location, free text
    pub location: String,
    pub is_new_bank: bool,
    /// Submission time
    pub timestamp: DateTime<Utc>,
}

impl Claim {
    /// Creates a claim timestamped now with empty free-text fields
    pub fn new(claimant_id: impl Into<String>, amount: Decimal) -> Result<Self, FraudError> {
        let claim = Self {
            claim_id: ClaimId::new(),
            claimant_id: claimant_id.into().trim().to_string(),
            amount,
            report_delay_days: 0,
            provider: String::new(),
            notes: String::new(),
            location: String::new(),
            is_new_bank: false,
            timestamp: Utc::now(),
        };
        claim.validate()?;
        Ok(claim)
    }

    pub fn with_report_delay(mut self, days: u32) -> Self {
        self.report_delay_days = days;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into().trim().to_string();
        self
    }

    pub fn with_notes(mut self, notes: impl AsRef<str>) -> Self {
        self.notes = sanitize_notes(notes.as_ref());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into().trim().to_string();
        self
    }

    pub fn with_new_bank(mut self, is_new_bank: bool) -> Self {
        self.is_new_bank = is_new_bank;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Checks the invariants scoring relies on
    pub fn validate(&self) -> Result<(), FraudError> {
        if self.claimant_id.trim().is_empty() {
            return Err(FraudError::validation("claimant_id must not be empty"));
        }
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(FraudError::validation(format!(
                "amount must not be negative, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    pub fn provider_lower(&self) -> String {
        self.provider.to_lowercase()
    }

    pub fn notes_lower(&self) -> String {
        self.notes.to_lowercase()
    }
}

/// Strips control characters (keeping newlines and tabs) and caps the length
pub fn sanitize_notes(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(MAX_NOTES_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}
