//! Feature extraction
//!
//! Maps a claim and everything learned about it into the fixed 14-slot
//! vector the probability backends consume. Extraction is pure: history is
//! fetched beforehand and passed in.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::alarm::{high_severity_count, Alarm, AlarmType};
use crate::claim::Claim;
use crate::history::ClaimantHistory;
use crate::signals::SignalSnapshot;

/// Divisor for `amount_normalized`
pub const AMOUNT_SCALE: f64 = 5000.0;

pub const FEATURE_COUNT: usize = 14;

/// Slot names, in vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "amount_normalized",
    "delay_days",
    "is_new_bank",
    "is_out_of_network",
    "num_alarms",
    "high_severity_count",
    "repeat_count",
    "text_similarity_score",
    "location_distance",
    "time_anomaly_score",
    "suspicious_keyword_count",
    "sentiment_score",
    "vendor_risk_score",
    "external_mismatch_count",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FraudFeatures {
    pub amount_normalized: f64,
    pub delay_days: f64,
    pub is_new_bank: f64,
    pub is_out_of_network: f64,
    pub num_alarms: f64,
    pub high_severity_count: f64,
    pub repeat_count: f64,
    pub text_similarity_score: f64,
    pub location_distance: f64,
    pub time_anomaly_score: f64,
    pub suspicious_keyword_count: f64,
    pub sentiment_score: f64,
    pub vendor_risk_score: f64,
    pub external_mismatch_count: f64,
}

impl FraudFeatures {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.amount_normalized,
            self.delay_days,
            self.is_new_bank,
            self.is_out_of_network,
            self.num_alarms,
            self.high_severity_count,
            self.repeat_count,
            self.text_similarity_score,
            self.location_distance,
            self.time_anomaly_score,
            self.suspicious_keyword_count,
            self.sentiment_score,
            self.vendor_risk_score,
            self.external_mismatch_count,
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// Number of alarms the vector was built from
    pub fn alarm_count(&self) -> usize {
        self.num_alarms.max(0.0) as usize
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn extract(
        &self,
        claim: &Claim,
        alarms: &[Alarm],
        signals: &SignalSnapshot,
        history: &ClaimantHistory,
    ) -> FraudFeatures {
        let has = |t: AlarmType| alarms.iter().any(|a| a.alarm_type == t);
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let text = signals.text.clone().unwrap_or_default();

        let features = FraudFeatures {
            amount_normalized: claim.amount.to_f64().unwrap_or(f64::NAN) / AMOUNT_SCALE,
            delay_days: f64::from(claim.report_delay_days),
            is_new_bank: flag(claim.is_new_bank),
            is_out_of_network: flag(claim.provider_lower().contains("out-of-network")),
            num_alarms: alarms.len() as f64,
            high_severity_count: high_severity_count(alarms) as f64,
            repeat_count: f64::from(history.repeat_count),
            text_similarity_score: text.max_similarity,
            location_distance: signals.distance_miles.unwrap_or(0.0),
            time_anomaly_score: flag(has(AlarmType::TimePattern)),
            suspicious_keyword_count: f64::from(text.keyword_count),
            sentiment_score: text.sentiment,
            vendor_risk_score: flag(has(AlarmType::VendorFraud)),
            external_mismatch_count: alarms
                .iter()
                .filter(|a| a.alarm_type == AlarmType::ExternalMismatch)
                .count() as f64,
        };

        if !features.is_finite() {
            error!(
                claimant_id = %claim.claimant_id,
                ?features,
                "Non-finite feature value, using the default vector"
            );
            return FraudFeatures::default();
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::TextAnalysis;
    use rust_decimal_macros::dec;

    #[test]
    fn test_names_match_slots() {
        assert_eq!(FEATURE_NAMES.len(), FraudFeatures::default().to_array().len());
    }

    #[test]
    fn test_extract_maps_claim_and_alarms() {
        let claim = Claim::new("C-1", dec!(12500))
            .unwrap()
            .with_report_delay(9)
            .with_new_bank(true)
            .with_provider("Out-of-Network Labs");
        let alarms = vec![
            Alarm::new(AlarmType::HighAmount, "big"),
            Alarm::new(AlarmType::VendorFraud, "vendor"),
            Alarm::new(AlarmType::TimePattern, "late night"),
        ];
        let signals = SignalSnapshot {
            text: Some(TextAnalysis {
                keyword_count: 2,
                suspicious_phrases: vec![],
                sentiment: -0.5,
                max_similarity: 0.4,
            }),
            distance_miles: Some(250.0),
            ..Default::default()
        };
        let history = ClaimantHistory { repeat_count: 4, ..Default::default() };

        let f = FeatureExtractor.extract(&claim, &alarms, &signals, &history);

        assert_eq!(f.amount_normalized, 2.5);
        assert_eq!(f.delay_days, 9.0);
        assert_eq!(f.is_new_bank, 1.0);
        assert_eq!(f.is_out_of_network, 1.0);
        assert_eq!(f.num_alarms, 3.0);
        assert_eq!(f.high_severity_count, 2.0);
        assert_eq!(f.repeat_count, 4.0);
        assert_eq!(f.text_similarity_score, 0.4);
        assert_eq!(f.location_distance, 250.0);
        assert_eq!(f.time_anomaly_score, 1.0);
        assert_eq!(f.suspicious_keyword_count, 2.0);
        assert_eq!(f.sentiment_score, -0.5);
        assert_eq!(f.vendor_risk_score, 1.0);
        assert_eq!(f.external_mismatch_count, 0.0);
    }

    #[test]
    fn test_non_network_is_not_out_of_network_feature() {
        let claim = Claim::new("C-1", dec!(1)).unwrap().with_provider("non-network lab");
        let f = FeatureExtractor.extract(&claim, &[], &SignalSnapshot::default(), &ClaimantHistory::default());
        assert_eq!(f.is_out_of_network, 0.0);
    }

    #[test]
    fn test_non_finite_signal_yields_default() {
        let claim = Claim::new("C-1", dec!(100)).unwrap();
        let signals = SignalSnapshot {
            distance_miles: Some(f64::INFINITY),
            ..Default::default()
        };
        let f = FeatureExtractor.extract(&claim, &[], &signals, &ClaimantHistory::default());
        assert_eq!(f, FraudFeatures::default());
    }
}
