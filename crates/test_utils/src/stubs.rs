//! Port Stubs
//!
//! Deterministic, failing and slow implementations of the engine's ports
//! for exercising degraded paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use core_kernel::{DomainPort, PortError};
use domain_fraud::audit::{AuditSink, ScoringRecord};
use domain_fraud::features::FEATURE_COUNT;
use domain_fraud::history::{HistoryStore, HistoryWindow};
use domain_fraud::scoring::{ProbabilityBackend, ScoreSource};
use domain_fraud::signals::{
    GeoDistance, TextAnalysis, TextAnalyzer, VendorAssessment, VendorRisk, WeatherLookup, WeatherReport,
};
use domain_fraud::ScoringError;

/// Always answers the same probability
pub struct FixedProbabilityBackend {
    probability: f64,
    calls: AtomicUsize,
}

impl FixedProbabilityBackend {
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProbabilityBackend for FixedProbabilityBackend {
    fn source(&self) -> ScoreSource {
        ScoreSource::LocalModel
    }

    async fn is_ready(&self) -> bool {
        true
    }

    async fn predict_proba(&self, _features: &[f64; FEATURE_COUNT]) -> Result<f64, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probability)
    }
}

/// Ready, but every prediction fails
pub struct FailingBackend;

#[async_trait]
impl ProbabilityBackend for FailingBackend {
    fn source(&self) -> ScoreSource {
        ScoreSource::RemoteEndpoint
    }

    async fn is_ready(&self) -> bool {
        true
    }

    async fn predict_proba(&self, _features: &[f64; FEATURE_COUNT]) -> Result<f64, ScoringError> {
        Err(ScoringError::Remote(PortError::unavailable("inference")))
    }
}

/// Answers after `delay`
pub struct SlowBackend {
    pub delay: Duration,
    pub probability: f64,
}

#[async_trait]
impl ProbabilityBackend for SlowBackend {
    fn source(&self) -> ScoreSource {
        ScoreSource::RemoteEndpoint
    }

    async fn is_ready(&self) -> bool {
        true
    }

    async fn predict_proba(&self, _features: &[f64; FEATURE_COUNT]) -> Result<f64, ScoringError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.probability)
    }
}

/// Returns a probability outside [0, 1], or NaN
pub struct OutOfRangeBackend(pub f64);

#[async_trait]
impl ProbabilityBackend for OutOfRangeBackend {
    fn source(&self) -> ScoreSource {
        ScoreSource::LocalModel
    }

    async fn is_ready(&self) -> bool {
        true
    }

    async fn predict_proba(&self, _features: &[f64; FEATURE_COUNT]) -> Result<f64, ScoringError> {
        Ok(self.0)
    }
}

pub struct FailingTextAnalyzer;

impl DomainPort for FailingTextAnalyzer {}

#[async_trait]
impl TextAnalyzer for FailingTextAnalyzer {
    async fn analyze(&self, _text: &str, _prior_notes: &[String]) -> Result<TextAnalysis, PortError> {
        Err(PortError::unavailable("text_analyzer"))
    }
}

/// Vendor risk that sleeps before answering
pub struct SlowVendorRisk {
    pub delay: Duration,
    pub assessment: VendorAssessment,
}

impl SlowVendorRisk {
    pub fn fraudulent_after(delay: Duration) -> Self {
        Self {
            delay,
            assessment: VendorAssessment {
                is_fraudulent: true,
                risk_score: 0.99,
                reason: "slow stub".to_string(),
            },
        }
    }
}

impl DomainPort for SlowVendorRisk {}

#[async_trait]
impl VendorRisk for SlowVendorRisk {
    async fn check(&self, _provider: &str) -> Result<Option<VendorAssessment>, PortError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(self.assessment.clone()))
    }
}

/// The same weather everywhere, every day
pub struct StaticWeather(pub WeatherReport);

impl StaticWeather {
    pub fn dry() -> Self {
        Self(WeatherReport {
            condition: "clear".to_string(),
            is_rainy: false,
            temp: 28.0,
        })
    }

    pub fn rainy() -> Self {
        Self(WeatherReport {
            condition: "rain".to_string(),
            is_rainy: true,
            temp: 12.0,
        })
    }
}

impl DomainPort for StaticWeather {}

#[async_trait]
impl WeatherLookup for StaticWeather {
    async fn condition_at(&self, _location: &str, _date: NaiveDate) -> Result<Option<WeatherReport>, PortError> {
        Ok(Some(self.0.clone()))
    }
}

pub struct FixedDistance(pub Option<f64>);

impl DomainPort for FixedDistance {}

#[async_trait]
impl GeoDistance for FixedDistance {
    async fn distance(&self, _from: &str, _to: &str) -> Result<Option<f64>, PortError> {
        Ok(self.0)
    }
}

/// A claim store that is down: every read and write fails
pub struct FailingAuditSink;

impl DomainPort for FailingAuditSink {}

#[async_trait]
impl HistoryStore for FailingAuditSink {
    async fn count_recent_claims(&self, _claimant_id: &str, _window: &HistoryWindow) -> Result<u32, PortError> {
        Err(PortError::connection("store offline"))
    }

    async fn recent_notes(&self, _claimant_id: &str, _window: &HistoryWindow) -> Result<Vec<String>, PortError> {
        Err(PortError::connection("store offline"))
    }

    async fn average_amount(&self, _claimant_id: &str, _window: &HistoryWindow) -> Result<Option<Decimal>, PortError> {
        Err(PortError::connection("store offline"))
    }

    async fn last_claim_before(
        &self,
        _claimant_id: &str,
        _before: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, PortError> {
        Err(PortError::connection("store offline"))
    }

    async fn registered_address(&self, _claimant_id: &str) -> Result<Option<String>, PortError> {
        Err(PortError::connection("store offline"))
    }
}

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn persist(&self, _record: &ScoringRecord) -> Result<(), PortError> {
        Err(PortError::connection("store offline"))
    }
}
