//! Pre-built Test Fixtures
//!
//! Ready-to-use claims and settings. Timestamps are fixed so the time
//! pattern check stays quiet unless a test asks otherwise.

use chrono::{DateTime, Duration, TimeZone, Utc};
use domain_fraud::{Claim, EngineConfig};
use rust_decimal_macros::dec;

/// Fixture for submission times
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Wednesday 2024-03-13 10:00 UTC
    pub fn weekday_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 13, 10, 0, 0).unwrap()
    }

    /// Wednesday 2024-03-13 03:30 UTC, inside the unusual hours
    pub fn weekday_night() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 13, 3, 30, 0).unwrap()
    }

    /// Saturday 2024-03-16 14:00 UTC
    pub fn saturday_afternoon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 16, 14, 0, 0).unwrap()
    }

    pub fn days_before(at: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        at - Duration::days(days)
    }

    pub fn hours_before(at: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
        at - Duration::hours(hours)
    }
}

/// Fixture for reference claims
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// Blacklisted provider, staged-accident notes, new bank account,
    /// late report, high amount, far from the default registered address
    pub fn high_risk() -> Claim {
        Claim::new("claimant-high-risk", dec!(15000))
            .expect("valid fixture")
            .with_report_delay(10)
            .with_provider("shady_clinic")
            .with_notes("This was a staged accident, I need quick cash for the repairs")
            .with_new_bank(true)
            .with_location("Los Angeles, CA")
            .with_timestamp(TemporalFixtures::weekday_morning())
    }

    /// Nothing for any check to find
    pub fn low_risk() -> Claim {
        Claim::new("claimant-low-risk", dec!(2000))
            .expect("valid fixture")
            .with_report_delay(2)
            .with_provider("Trusted Clinic")
            .with_notes("Routine annual checkup and blood work, receipts attached")
            .with_new_bank(false)
            .with_location("New York, NY")
            .with_timestamp(TemporalFixtures::weekday_morning())
    }

    /// Moderate amount and delay with an out-of-network provider
    pub fn moderate() -> Claim {
        Claim::new("claimant-moderate", dec!(8000))
            .expect("valid fixture")
            .with_report_delay(5)
            .with_provider("out-of-network clinic")
            .with_timestamp(TemporalFixtures::weekday_morning())
    }

    /// Notes mentioning rain, for the external mismatch check
    pub fn wet_floor(location: &str) -> Claim {
        Claim::new("claimant-wet-floor", dec!(1200))
            .expect("valid fixture")
            .with_provider("City Hospital")
            .with_notes("Slipped on the wet floor after heavy rain")
            .with_location(location)
            .with_timestamp(TemporalFixtures::weekday_morning())
    }
}

/// Fixture for engine settings
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Default thresholds with short timeouts so slow-provider tests finish fast
    pub fn fast() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.timeouts.signal_ms = 200;
        config.timeouts.history_ms = 200;
        config.timeouts.ml_ms = 200;
        config.timeouts.scoring_deadline_ms = 1000;
        config
    }

    /// As [`ConfigFixtures::fast`], attaching features to every result
    pub fn with_features() -> EngineConfig {
        let mut config = Self::fast();
        config.include_features = true;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Weekday};

    #[test]
    fn test_weekday_morning_is_quiet() {
        let at = TemporalFixtures::weekday_morning();
        assert_eq!(at.weekday(), Weekday::Wed);
        assert_eq!(at.hour(), 10);
    }

    #[test]
    fn test_fixtures_are_valid() {
        assert!(ClaimFixtures::high_risk().validate().is_ok());
        assert!(ClaimFixtures::low_risk().validate().is_ok());
        assert!(ClaimFixtures::moderate().validate().is_ok());
        assert!(ConfigFixtures::fast().validate().is_ok());
    }
}
