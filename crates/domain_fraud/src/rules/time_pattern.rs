//! Submission timing anomalies

use chrono::{Datelike, Timelike, Weekday};

use crate::alarm::{Alarm, AlarmType};
use crate::error::RuleError;

use super::{merge_findings, RuleCheck, RuleContext};

/// Unusual hours, weekend filing, or a claim shortly after the previous one
///
/// All findings are merged into a single alarm. The gap finding needs
/// history and is skipped without it. Times are evaluated in UTC.
pub struct TimePatternCheck;

impl RuleCheck for TimePatternCheck {
    fn alarm_type(&self) -> AlarmType {
        AlarmType::TimePattern
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Option<Alarm>, RuleError> {
        let t = &ctx.thresholds;
        let at = ctx.claim.timestamp;
        let mut findings = Vec::new();
        let mut alarm_flags = Vec::new();

        let hour = at.hour();
        if (t.unusual_hours_start..=t.unusual_hours_end).contains(&hour) {
            findings.push(format!("Submitted at an unusual hour ({hour:02}:{:02} UTC)", at.minute()));
            alarm_flags.push("unusual_hour");
        }

        let weekday = at.weekday();
        if t.check_weekends && matches!(weekday, Weekday::Sat | Weekday::Sun) {
            findings.push(format!("Submitted on a weekend ({weekday})"));
            alarm_flags.push("weekend");
        }

        if let Some(previous) = ctx.history.last_claim_at {
            let gap = at.signed_duration_since(previous);
            if gap < chrono::Duration::zero() {
                return Err(RuleError::InvalidValue {
                    rule: "time_pattern",
                    message: format!("previous claim at {previous} is after this claim"),
                });
            }
            if gap < chrono::Duration::hours(t.min_gap_hours) {
                let hours = gap.num_minutes() as f64 / 60.0;
                findings.push(format!("Filed {hours:.1} hours after the previous claim"));
                alarm_flags.push("rapid_succession");
            }
        }

        Ok(merge_findings(&findings)
            .map(|description| Alarm::new(AlarmType::TimePattern, description).with_evidence("patterns", alarm_flags)))
    }
}
