//! Custom Test Assertions
//!
//! Assertion helpers for scoring results that give more meaningful error
//! messages than standard assertions.

use std::time::Duration;

use domain_fraud::adapters::InMemoryAuditStore;
use domain_fraud::{AlarmType, Decision, ScoringResult};

/// Asserts that the probability lies in [0, 1]
pub fn assert_probability_in_bounds(result: &ScoringResult) {
    assert!(
        (0.0..=1.0).contains(&result.fraud_probability),
        "Probability {} outside [0, 1] for claimant {}",
        result.fraud_probability,
        result.claimant_id
    );
}

pub fn assert_decision(result: &ScoringResult, expected: Decision) {
    assert_eq!(
        result.decision, expected,
        "Expected {expected}, got {} (probability {:.3}, alarms {:?})",
        result.decision,
        result.fraud_probability,
        alarm_types(result)
    );
}

/// Asserts that an alarm of `alarm_type` was raised
pub fn assert_has_alarm(result: &ScoringResult, alarm_type: AlarmType) {
    assert!(
        result.alarms.iter().any(|a| a.alarm_type == alarm_type),
        "Expected a {alarm_type} alarm, got {:?}",
        alarm_types(result)
    );
}

pub fn assert_no_alarm(result: &ScoringResult, alarm_type: AlarmType) {
    assert!(
        result.alarms.iter().all(|a| a.alarm_type != alarm_type),
        "Unexpected {alarm_type} alarm: {:?}",
        alarm_types(result)
    );
}

/// Asserts that no alarm type appears twice
pub fn assert_alarms_distinct(result: &ScoringResult) {
    let types = alarm_types(result);
    for (i, t) in types.iter().enumerate() {
        assert!(!types[i + 1..].contains(t), "Alarm {t} raised more than once: {types:?}");
    }
}

pub fn alarm_types(result: &ScoringResult) -> Vec<AlarmType> {
    result.alarms.iter().map(|a| a.alarm_type).collect()
}

/// Waits until the store holds at least `count` records
///
/// Persistence runs in the background, so tests that read history back
/// must wait for it.
///
/// # Panics
///
/// Panics if the records do not arrive within two seconds
pub async fn wait_for_records(store: &InMemoryAuditStore, count: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while store.len().await < count {
        assert!(
            tokio::time::Instant::now() < deadline,
            "Expected {count} persisted records, found {}",
            store.len().await
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
