//! Fraud Risk Decision Engine
//!
//! Assesses an insurance claim for fraud risk and emits an auditable
//! decision by fusing rule-based alarms with a machine-learned probability.
//!
//! # Scoring Pipeline
//!
//! ```text
//! Claim -> Signals (text, geo, vendor, weather) -> Rules -> Alarms
//!       -> Features -> Probability (model or fallback) -> Decision
//! ```
//!
//! External signal providers and the probability backend are pluggable
//! ports. Any of them may fail or time out; the engine degrades to the
//! documented defaults and still returns a decision.

pub mod adapters;
pub mod alarm;
pub mod audit;
pub mod claim;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod explain;
pub mod features;
pub mod history;
pub mod rules;
pub mod scoring;
pub mod signals;

pub use alarm::{Alarm, AlarmSeverity, AlarmType};
pub use audit::{AuditSink, ScoringRecord};
pub use claim::Claim;
pub use config::{DecisionThresholds, EngineConfig, RuleThresholds, ScorerConfig, TimeoutConfig};
pub use decision::{Decision, DecisionPolicy, RiskLevel};
pub use engine::{BatchSummary, FraudEngine, FraudEngineBuilder, ScoringResult};
pub use error::{FraudError, RuleError, ScoringError};
pub use explain::{AlarmCatalog, AlarmExplanation};
pub use features::{FeatureExtractor, FraudFeatures, FEATURE_COUNT, FEATURE_NAMES};
pub use history::{ClaimantHistory, HistoryStore, HistoryWindow};
pub use rules::{RuleCheck, RuleContext, RuleEvaluator};
pub use scoring::{MlScorer, ProbabilityBackend, ScoreOutcome, ScoreSource};
pub use signals::{
    GeoDistance, SignalKind, SignalSnapshot, TextAnalysis, TextAnalyzer, VendorAssessment, VendorRisk,
    WeatherLookup, WeatherReport,
};
