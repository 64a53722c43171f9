//! Checks driven by external signals
//!
//! Each returns `Ok(None)` when its signal is missing from the snapshot.

use crate::alarm::{Alarm, AlarmType};
use crate::error::RuleError;
use crate::signals::mentions_weather;

use super::{merge_findings, RuleCheck, RuleContext};

const KEYWORDS_SHOWN: usize = 3;

pub struct SuspiciousKeywordsCheck;

impl RuleCheck for SuspiciousKeywordsCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::SuspiciousKeywords
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        let Some(text) = &ctx.signals.text else {
            return Ok(None);
        };
        if text.keyword_count == 0 {
            return Ok(None);
        }
        let top: Vec<&str> = text
            .suspicious_phrases
            .iter()
            .take(KEYWORDS_SHOWN)
            .map(String::as_str)
            .collect();
        Ok(Some(
            Alarm::new(
                AlarmType::SuspiciousKeywords,
                format!(
                    "{} suspicious keyword(s) detected: {}",
                    text.keyword_count,
                    top.join(", ")
                ),
            )
            .with_evidence("keyword_count", text.keyword_count),
        ))
    }
}

pub struct LocationMismatchCheck;

impl RuleCheck for LocationMismatchCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::LocationMismatch
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        let Some(miles) = ctx.signals.distance_miles else {
            return Ok(None);
        };
        if !miles.is_finite() || miles < 0.0 {
            return Err(RuleError::InvalidValue {
                rule: "location_mismatch",
                message: format!("distance {miles} is not a valid mileage"),
            });
        }
        if miles <= ctx.thresholds.location_distance_threshold {
            return Ok(None);
        }
        Ok(Some(
            Alarm::new(
                AlarmType::LocationMismatch,
                format!(
                    "Incident location {} is {:.0} miles from the registered address",
                    ctx.claim.location, miles
                ),
            )
            .with_evidence("distance_miles", (miles * 10.0).round() / 10.0),
        ))
    }
}

pub struct VendorFraudCheck;

impl RuleCheck for VendorFraudCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::VendorFraud
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        let Some(vendor) = &ctx.signals.vendor else {
            return Ok(None);
        };
        if !vendor.risk_score.is_finite() {
            return Err(RuleError::InvalidValue {
                rule: "vendor_fraud",
                message: format!("risk score {} is not finite", vendor.risk_score),
            });
        }
        if !vendor.is_fraudulent && vendor.risk_score <= ctx.thresholds.vendor_risk_threshold {
            return Ok(None);
        }
        let reason = if vendor.reason.is_empty() {
            "no reason given"
        } else {
            vendor.reason.as_str()
        };
        Ok(Some(
            Alarm::new(
                AlarmType::VendorFraud,
                format!(
                    "Provider {} flagged as high risk ({reason}, score {:.2})",
                    ctx.claim.provider, vendor.risk_score
                ),
            )
            .with_evidence("risk_score", vendor.risk_score)
            .with_evidence("reason", reason),
        ))
    }
}

/// Weather at the incident contradicts the notes
pub struct ExternalMismatchCheck;

impl RuleCheck for ExternalMismatchCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::ExternalMismatch
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        let Some(weather) = &ctx.signals.weather else {
            return Ok(None);
        };
        let notes = ctx.claim.notes_lower();
        let mut findings = Vec::new();

        if mentions_weather(&notes) && !weather.is_rainy {
            let condition = if weather.condition.is_empty() {
                "dry"
            } else {
                weather.condition.as_str()
            };
            findings.push(format!(
                "Notes describe weather-related conditions but weather at {} was {condition}",
                ctx.claim.location
            ));
        }
        if notes.contains("cold") && weather.temp > ctx.thresholds.cold_temp_threshold {
            findings.push(format!(
                "Cold-related incident reported while it was {:.1}°C",
                weather.temp
            ));
        }

        Ok(merge_findings(&findings).map(|description| {
            Alarm::new(AlarmType::ExternalMismatch, description)
                .with_evidence("weather_condition", weather.condition.clone())
                .with_evidence("temperature_c", weather.temp)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::Claim;
    use crate::config::RuleThresholds;
    use crate::history::ClaimantHistory;
    use crate::signals::{SignalSnapshot, TextAnalysis, VendorAssessment, WeatherReport};
    use rust_decimal_macros::dec;

    fn run(check: &dyn RuleCheck, claim: &Claim, signals: &SignalSnapshot) -> Result<Option<Alarm>, RuleError> {
        let thresholds = RuleThresholds::default();
        let history = ClaimantHistory::default();
        check.check(&RuleContext {
            claim,
            signals,
            history: &history,
            thresholds: &thresholds,
        })
    }

    fn claim() -> Claim {
        Claim::new("C-1", dec!(100)).unwrap()
    }

    #[test]
    fn test_missing_signals_never_fire() {
        let empty = SignalSnapshot::default();
        let checks: [&dyn RuleCheck; 4] = [
            &SuspiciousKeywordsCheck,
            &LocationMismatchCheck,
            &VendorFraudCheck,
            &ExternalMismatchCheck,
        ];
        for check in checks {
            assert!(run(check, &claim(), &empty).unwrap().is_none());
        }
    }

    #[test]
    fn test_keywords_show_top_three() {
        let signals = SignalSnapshot {
            text: Some(TextAnalysis {
                keyword_count: 5,
                suspicious_phrases: vec!["fake".into(), "staged".into(), "ghost".into(), "exaggerated".into()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let alarm = run(&SuspiciousKeywordsCheck, &claim(), &signals).unwrap().unwrap();
        assert_eq!(alarm.description, "5 suspicious keyword(s) detected: fake, staged, ghost");
    }

    #[test]
    fn test_location_threshold() {
        let near = SignalSnapshot { distance_miles: Some(100.0), ..Default::default() };
        let far = SignalSnapshot { distance_miles: Some(2445.6), ..Default::default() };

        assert!(run(&LocationMismatchCheck, &claim(), &near).unwrap().is_none());
        assert!(run(&LocationMismatchCheck, &claim(), &far).unwrap().is_some());
    }

    #[test]
    fn test_vendor_flag_or_score() {
        let flagged = SignalSnapshot {
            vendor: Some(VendorAssessment { is_fraudulent: true, risk_score: 0.1, reason: "sanctioned".into() }),
            ..Default::default()
        };
        let risky = SignalSnapshot {
            vendor: Some(VendorAssessment { is_fraudulent: false, risk_score: 0.71, reason: String::new() }),
            ..Default::default()
        };
        let fine = SignalSnapshot {
            vendor: Some(VendorAssessment { is_fraudulent: false, risk_score: 0.7, reason: String::new() }),
            ..Default::default()
        };

        assert!(run(&VendorFraudCheck, &claim(), &flagged).unwrap().is_some());
        assert!(run(&VendorFraudCheck, &claim(), &risky).unwrap().is_some());
        assert!(run(&VendorFraudCheck, &claim(), &fine).unwrap().is_none());
    }

    #[test]
    fn test_external_mismatch_merges_findings() {
        let claim = claim()
            .with_location("Miami, FL")
            .with_notes("Slipped on a wet floor, caught a cold");
        let signals = SignalSnapshot {
            weather: Some(WeatherReport { condition: "clear".into(), is_rainy: false, temp: 31.0 }),
            ..Default::default()
        };
        let alarm = run(&ExternalMismatchCheck, &claim, &signals).unwrap().unwrap();

        assert!(alarm.is_high());
        assert!(alarm.description.contains("was clear"));
        assert!(alarm.description.contains("31.0°C"));
    }

    #[test]
    fn test_rainy_weather_is_consistent() {
        let claim = claim().with_location("Seattle, WA").with_notes("Slipped in the rain");
        let signals = SignalSnapshot {
            weather: Some(WeatherReport { condition: "rain".into(), is_rainy: true, temp: 12.0 }),
            ..Default::default()
        };
        assert!(run(&ExternalMismatchCheck, &claim, &signals).unwrap().is_none());
    }
}
