//! Property-Based Test Generators
//!
//! Proptest strategies for claims and alarms that respect the claim
//! invariants (non-empty claimant, non-negative amount).

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::ClaimId;
use domain_fraud::{Alarm, AlarmType, Claim};

/// Strategy for claim amounts from 0.00 to 1,000,000.00
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for submission times within 2024, at any hour
pub fn timestamp_2024_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..365i64, 0i64..24i64, 0i64..60i64).prop_map(|(days, hours, minutes)| {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + Duration::days(days)
            + Duration::hours(hours)
            + Duration::minutes(minutes)
    })
}

pub fn provider_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("City Hospital".to_string()),
        Just("Trusted Clinic".to_string()),
        Just("out-of-network clinic".to_string()),
        Just("shady_clinic".to_string()),
        Just("ghost_hospital annex".to_string()),
        Just(String::new()),
    ]
}

pub fn notes_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("Routine checkup, receipts attached".to_string()),
        Just("This was a staged accident".to_string()),
        Just("Slipped on the wet floor during the storm".to_string()),
        Just("Need quick cash, the damage is exaggerated".to_string()),
        "[a-z ]{0,80}",
    ]
}

pub fn location_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("New York, NY".to_string()),
        Just("Los Angeles, CA".to_string()),
        Just("Chicago, IL".to_string()),
        Just("Atlantis".to_string()),
    ]
}

/// Strategy for ClaimId
pub fn claim_id_strategy() -> impl Strategy<Value = ClaimId> {
    any::<[u8; 16]>().prop_map(|bytes| ClaimId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for valid claims covering the inputs every check reads
pub fn claim_strategy() -> impl Strategy<Value = Claim> {
    (
        "[a-z]{1,8}-[0-9]{1,4}",
        amount_strategy(),
        0u32..60u32,
        provider_strategy(),
        notes_strategy(),
        location_strategy(),
        any::<bool>(),
        timestamp_2024_strategy(),
    )
        .prop_map(|(claimant, amount, delay, provider, notes, location, new_bank, at)| {
            Claim::new(claimant, amount)
                .expect("generated claim must be valid")
                .with_report_delay(delay)
                .with_provider(provider)
                .with_notes(notes)
                .with_location(location)
                .with_new_bank(new_bank)
                .with_timestamp(at)
        })
}

pub fn alarm_type_strategy() -> impl Strategy<Value = AlarmType> {
    proptest::sample::select(AlarmType::ALL.to_vec())
}

/// Strategy for alarm lists with distinct types
pub fn alarms_strategy() -> impl Strategy<Value = Vec<Alarm>> {
    proptest::sample::subsequence(AlarmType::ALL.to_vec(), 0..=AlarmType::ALL.len()).prop_map(|types| {
        types
            .into_iter()
            .map(|t| Alarm::new(t, format!("generated {t} finding")))
            .collect()
    })
}

/// Strategy for probabilities in [0, 1]
pub fn probability_strategy() -> impl Strategy<Value = f64> {
    0.0f64..=1.0f64
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_generated_claims_are_valid(claim in claim_strategy()) {
            prop_assert!(claim.validate().is_ok());
        }

        #[test]
        fn test_generated_alarms_are_distinct(alarms in alarms_strategy()) {
            let mut types: Vec<_> = alarms.iter().map(|a| a.alarm_type).collect();
            types.dedup();
            prop_assert_eq!(types.len(), alarms.len());
        }
    }
}
