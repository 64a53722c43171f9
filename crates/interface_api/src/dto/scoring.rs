//! Scoring DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_fraud::{BatchSummary, Claim, ScoringResult};

use crate::error::ApiError;

/// Upper bound on claims per batch request
pub const MAX_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScoreClaimRequest {
    #[validate(length(min = 1, max = 128, message = "must not be blank"))]
    pub claimant_id: String,
    #[validate(range(exclusive_min = 0.0, message = "must be greater than zero"))]
    pub amount: f64,
    #[serde(default)]
    pub report_delay_days: u32,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_new_bank: bool,
    /// ISO-8601; defaults to the time of the request
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ScoreClaimRequest {
    /// Validates the request and builds the domain claim
    pub fn into_claim(self) -> Result<Claim, ApiError> {
        self.validate()?;

        let amount = Decimal::try_from(self.amount)
            .map_err(|_| ApiError::validation(format!("amount {} is not representable", self.amount)))?
            .round_dp(2);
        if amount <= Decimal::ZERO {
            return Err(ApiError::Validation {
                message: "Request validation failed".to_string(),
                details: vec!["amount: must be at least 0.01".to_string()],
            });
        }
        let mut claim = Claim::new(self.claimant_id, amount)?
            .with_report_delay(self.report_delay_days)
            .with_provider(self.provider)
            .with_notes(&self.notes)
            .with_location(self.location)
            .with_new_bank(self.is_new_bank);

        if let Some(raw) = self.timestamp.as_deref() {
            claim = claim.with_timestamp(parse_timestamp(raw)?);
        }
        Ok(claim)
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| {
            raw.trim()
                .parse::<chrono::NaiveDateTime>()
                .map(|naive| naive.and_utc())
        })
        .map_err(|_| ApiError::validation(format!("timestamp '{raw}' is not ISO-8601")))
}

#[derive(Debug, Deserialize)]
pub struct BatchScoreRequest {
    pub claims: Vec<ScoreClaimRequest>,
}

impl BatchScoreRequest {
    /// Validates every claim, reporting failures by index
    pub fn into_claims(self) -> Result<Vec<Claim>, ApiError> {
        if self.claims.len() > MAX_BATCH_SIZE {
            return Err(ApiError::validation(format!(
                "batch holds {} claims, the limit is {MAX_BATCH_SIZE}",
                self.claims.len()
            )));
        }

        let mut claims = Vec::with_capacity(self.claims.len());
        let mut details = Vec::new();
        for (index, request) in self.claims.into_iter().enumerate() {
            match request.into_claim() {
                Ok(claim) => claims.push(claim),
                Err(ApiError::Validation { message, details: inner }) if inner.is_empty() => {
                    details.push(format!("claims[{index}]: {message}"));
                }
                Err(ApiError::Validation { details: inner, .. }) => {
                    details.extend(inner.into_iter().map(|d| format!("claims[{index}].{d}")));
                }
                Err(other) => return Err(other),
            }
        }

        if details.is_empty() {
            Ok(claims)
        } else {
            Err(ApiError::Validation {
                message: "One or more claims are invalid".to_string(),
                details,
            })
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchScoreResponse {
    pub results: Vec<ScoringResult>,
    pub summary: BatchSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn request(amount: f64) -> ScoreClaimRequest {
        ScoreClaimRequest {
            claimant_id: "c-1".to_string(),
            amount,
            report_delay_days: 3,
            provider: "City Hospital".to_string(),
            notes: "Broken wrist".to_string(),
            location: "Chicago, IL".to_string(),
            is_new_bank: false,
            timestamp: Some("2024-03-13T10:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_into_claim() {
        let claim = request(1250.5).into_claim().unwrap();
        assert_eq!(claim.amount, dec!(1250.50));
        assert_eq!(claim.report_delay_days, 3);
        assert_eq!(claim.timestamp, Utc.with_ymd_and_hms(2024, 3, 13, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        let mut req = request(10.0);
        req.timestamp = Some("2024-03-13T10:00:00".to_string());
        let claim = req.into_claim().unwrap();
        assert_eq!(claim.timestamp, Utc.with_ymd_and_hms(2024, 3, 13, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        assert!(matches!(request(0.0).into_claim(), Err(ApiError::Validation { .. })));
        assert!(matches!(request(-5.0).into_claim(), Err(ApiError::Validation { .. })));
    }

    #[test]
    fn test_sub_cent_amount_rejected_after_rounding() {
        match request(0.004).into_claim() {
            Err(ApiError::Validation { details, .. }) => {
                assert_eq!(details, vec!["amount: must be at least 0.01".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(request(0.01).into_claim().unwrap().amount, dec!(0.01));
    }

    #[test]
    fn test_rejects_bad_timestamp() {
        let mut req = request(10.0);
        req.timestamp = Some("yesterday".to_string());
        assert!(matches!(req.into_claim(), Err(ApiError::Validation { .. })));
    }

    #[test]
    fn test_batch_reports_invalid_indexes() {
        let mut blank = request(10.0);
        blank.claimant_id = String::new();
        let batch = BatchScoreRequest {
            claims: vec![request(10.0), blank, request(-1.0)],
        };

        match batch.into_claims() {
            Err(ApiError::Validation { details, .. }) => {
                assert_eq!(details.len(), 2);
                assert!(details[0].starts_with("claims[1]"));
                assert!(details[1].starts_with("claims[2]"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    proptest::proptest! {
        #[test]
        fn test_amounts_below_a_cent_never_reach_the_engine(amount in -1.0e9f64..0.005) {
            proptest::prop_assert!(request(amount).into_claim().is_err());
        }

        #[test]
        fn test_positive_amounts_keep_cents(cents in 1u64..100_000_000) {
            let amount = cents as f64 / 100.0;
            let claim = request(amount).into_claim().unwrap();
            proptest::prop_assert_eq!(claim.amount, Decimal::new(cents as i64, 2));
        }
    }
}
