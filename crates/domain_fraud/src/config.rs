//! Engine configuration
//!
//! All thresholds are data, not code: every field has a default and the
//! whole tree deserializes from the API layer's configuration source.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{CircuitBreakerConfig, CoreError};

/// Phrases that raise `suspicious_text_phrases` when found in claim notes
pub const DEFAULT_SUSPICIOUS_PHRASES: &[&str] = &[
    "staged accident",
    "fake injury",
    "quick cash",
    "exaggerated pain",
    "ghost patient",
    "duplicate claim",
    "cash only",
    "out-of-network",
    "new bank account",
    "late reporting",
    "blacklist hit",
    "fake vendor",
    "fraudulent billing",
    "false invoice",
    "no witnesses",
    "inflated bill",
];

pub const DEFAULT_BLACKLIST: &[&str] = &["shady_clinic", "fake_vendor", "ghost_hospital"];

/// Top-level engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rules: RuleThresholds,
    pub decision: DecisionThresholds,
    pub timeouts: TimeoutConfig,
    pub scorer: ScorerConfig,
    /// Lookback for claimant history
    pub history_window_days: i64,
    /// How many prior notes the duplicate check compares against
    pub prior_notes_limit: usize,
    /// Claims scored concurrently by a batch request
    pub batch_concurrency: usize,
    /// Attach the feature vector to each result
    pub include_features: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules: RuleThresholds::default(),
            decision: DecisionThresholds::default(),
            timeouts: TimeoutConfig::default(),
            scorer: ScorerConfig::default(),
            history_window_days: 365,
            prior_notes_limit: 5,
            batch_concurrency: 8,
            include_features: false,
        }
    }
}

impl EngineConfig {
    /// Rejects settings that would make the decision policy inconsistent
    pub fn validate(&self) -> Result<(), CoreError> {
        let d = &self.decision;
        if !(0.0..=1.0).contains(&d.review_probability) || !(0.0..=1.0).contains(&d.reject_probability) {
            return Err(CoreError::configuration("decision probabilities must lie in [0, 1]"));
        }
        if d.review_probability > d.reject_probability {
            return Err(CoreError::configuration(format!(
                "review threshold {} exceeds reject threshold {}",
                d.review_probability, d.reject_probability
            )));
        }
        if self.rules.unusual_hours_start > self.rules.unusual_hours_end || self.rules.unusual_hours_end > 23 {
            return Err(CoreError::configuration("unusual hours must be an increasing range within 0..=23"));
        }
        if self.batch_concurrency == 0 {
            return Err(CoreError::configuration("batch_concurrency must be at least 1"));
        }
        if self.history_window_days <= 0 {
            return Err(CoreError::configuration("history_window_days must be positive"));
        }
        Ok(())
    }
}

/// Alarm check thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    pub late_report_days: u32,
    pub high_amount_threshold: Decimal,
    /// Multiple of the claimant's average amount that counts as high
    pub relative_amount_multiplier: Decimal,
    pub repeat_claim_threshold: u32,
    pub similarity_threshold: f64,
    /// Miles
    pub location_distance_threshold: f64,
    pub vendor_risk_threshold: f64,
    pub unusual_hours_start: u32,
    pub unusual_hours_end: u32,
    pub min_gap_hours: i64,
    pub check_weekends: bool,
    /// Celsius
    pub cold_temp_threshold: f64,
    pub blacklist: Vec<String>,
    pub suspicious_phrases: Vec<String>,
    /// Used when the claimant has no registered address on file
    pub default_registered_address: String,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            late_report_days: 7,
            high_amount_threshold: dec!(10000),
            relative_amount_multiplier: dec!(3),
            repeat_claim_threshold: 3,
            similarity_threshold: 0.8,
            location_distance_threshold: 100.0,
            vendor_risk_threshold: 0.7,
            unusual_hours_start: 2,
            unusual_hours_end: 5,
            min_gap_hours: 24,
            check_weekends: true,
            cold_temp_threshold: 20.0,
            blacklist: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
            suspicious_phrases: DEFAULT_SUSPICIOUS_PHRASES.iter().map(|s| s.to_string()).collect(),
            default_registered_address: "New York, NY".to_string(),
        }
    }
}

/// Probability and severity cut-offs for the decision policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    pub reject_probability: f64,
    pub review_probability: f64,
    /// HIGH alarms that force a rejection regardless of probability
    pub reject_high_count: usize,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            reject_probability: 0.75,
            review_probability: 0.30,
            reject_high_count: 2,
        }
    }
}

/// Timeouts in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub signal_ms: u64,
    pub history_ms: u64,
    pub ml_ms: u64,
    /// Overall budget for one scoring call
    pub scoring_deadline_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            signal_ms: 5000,
            history_ms: 2000,
            ml_ms: 5000,
            scoring_deadline_ms: 10000,
        }
    }
}

impl TimeoutConfig {
    pub fn signal(&self) -> Duration {
        Duration::from_millis(self.signal_ms)
    }

    pub fn history(&self) -> Duration {
        Duration::from_millis(self.history_ms)
    }

    pub fn ml(&self) -> Duration {
        Duration::from_millis(self.ml_ms)
    }

    pub fn scoring_deadline(&self) -> Duration {
        Duration::from_millis(self.scoring_deadline_ms)
    }
}

/// Probability backend selection
///
/// A local model artifact takes precedence over a remote endpoint; with
/// neither configured the scorer runs on the fallback heuristic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub model_path: Option<String>,
    pub inference_endpoint: Option<String>,
    pub circuit_breaker: CircuitBreakerConfig,
}
