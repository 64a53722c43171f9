//! Test Data Builders
//!
//! Builder patterns for claims and engines. Tests set only the fields
//! they care about and take defaults for everything else.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::ScoringId;
use domain_fraud::adapters::InMemoryAuditStore;
use domain_fraud::scoring::ProbabilityBackend;
use domain_fraud::signals::{GeoDistance, TextAnalyzer, VendorRisk, WeatherLookup};
use domain_fraud::{
    AuditSink, Claim, Decision, EngineConfig, FraudEngine, FraudFeatures, MlScorer, RiskLevel, ScoreSource,
    ScoringRecord, ScoringResult,
};

use crate::fixtures::{ConfigFixtures, TemporalFixtures};

/// Builder for constructing test claims
pub struct TestClaimBuilder {
    claimant_id: String,
    amount: Decimal,
    report_delay_days: u32,
    provider: String,
    notes: String,
    location: String,
    is_new_bank: bool,
    timestamp: DateTime<Utc>,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// Creates a builder for a quiet weekday claim of 500.00
    pub fn new() -> Self {
        Self {
            claimant_id: "claimant-1".to_string(),
            amount: dec!(500.00),
            report_delay_days: 1,
            provider: "City Hospital".to_string(),
            notes: String::new(),
            location: String::new(),
            is_new_bank: false,
            timestamp: TemporalFixtures::weekday_morning(),
        }
    }

    /// Creates a builder with a fake claimant name and filler notes
    pub fn random() -> Self {
        let name: String = Name().fake();
        let notes: String = Sentence(4..10).fake();
        Self::new()
            .with_claimant(name.to_lowercase().replace(' ', "-"))
            .with_notes(notes)
    }

    pub fn with_claimant(mut self, claimant_id: impl Into<String>) -> Self {
        self.claimant_id = claimant_id.into();
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_report_delay(mut self, days: u32) -> Self {
        self.report_delay_days = days;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_new_bank(mut self, is_new_bank: bool) -> Self {
        self.is_new_bank = is_new_bank;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn build(self) -> Claim {
        Claim::new(self.claimant_id, self.amount)
            .expect("test claim must be valid")
            .with_report_delay(self.report_delay_days)
            .with_provider(self.provider)
            .with_notes(self.notes)
            .with_location(self.location)
            .with_new_bank(self.is_new_bank)
            .with_timestamp(self.timestamp)
    }
}

/// A record for `claim` as the engine would have persisted it
pub fn prior_record(claim: Claim) -> ScoringRecord {
    let result = ScoringResult {
        scoring_id: ScoringId::new(),
        claimant_id: claim.claimant_id.clone(),
        fraud_probability: 0.0,
        decision: Decision::Approve,
        alarms: Vec::new(),
        explanation: String::new(),
        timestamp: claim.timestamp,
        degraded: true,
        score_source: ScoreSource::Fallback,
        risk_level: RiskLevel::Low,
        recommendation: None,
        unavailable_signals: Vec::new(),
        features_used: None,
    };
    ScoringRecord {
        claim,
        features: FraudFeatures::default(),
        result,
    }
}

/// Stores `claims` as prior history
pub async fn seed_history(store: &InMemoryAuditStore, claims: Vec<Claim>) {
    for claim in claims {
        store
            .persist(&prior_record(claim))
            .await
            .expect("in-memory persist cannot fail");
    }
}

/// An engine together with the in-memory store behind it
pub struct TestEngine {
    pub engine: FraudEngine,
    pub store: Arc<InMemoryAuditStore>,
}

/// Builder for engines under test
///
/// Without a backend the scorer runs on the fallback heuristic, so
/// probabilities are a deterministic function of the alarm count.
pub struct TestEngineBuilder {
    config: EngineConfig,
    backend: Option<Arc<dyn ProbabilityBackend>>,
    text: Option<Arc<dyn TextAnalyzer>>,
    geo: Option<Arc<dyn GeoDistance>>,
    vendor: Option<Arc<dyn VendorRisk>>,
    weather: Option<Arc<dyn WeatherLookup>>,
    audit: Option<Arc<dyn AuditSink>>,
    store: Arc<InMemoryAuditStore>,
}

impl Default for TestEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: ConfigFixtures::fast(),
            backend: None,
            text: None,
            geo: None,
            vendor: None,
            weather: None,
            audit: None,
            store: Arc::new(InMemoryAuditStore::new()),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_backend(mut self, backend: impl ProbabilityBackend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    pub fn with_shared_backend(mut self, backend: Arc<dyn ProbabilityBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_text_analyzer(mut self, text: impl TextAnalyzer + 'static) -> Self {
        self.text = Some(Arc::new(text));
        self
    }

    pub fn with_geo_distance(mut self, geo: impl GeoDistance + 'static) -> Self {
        self.geo = Some(Arc::new(geo));
        self
    }

    pub fn with_vendor_risk(mut self, vendor: impl VendorRisk + 'static) -> Self {
        self.vendor = Some(Arc::new(vendor));
        self
    }

    pub fn with_weather(mut self, weather: impl WeatherLookup + 'static) -> Self {
        self.weather = Some(Arc::new(weather));
        self
    }

    /// Replaces the in-memory store as the engine's audit sink
    pub fn with_audit_sink(mut self, audit: impl AuditSink + 'static) -> Self {
        self.audit = Some(Arc::new(audit));
        self
    }

    /// Uses `store` so tests can seed history before scoring
    pub fn with_store(mut self, store: Arc<InMemoryAuditStore>) -> Self {
        self.store = store;
        self
    }

    pub fn build(self) -> TestEngine {
        let scorer = match self.backend {
            Some(backend) => MlScorer::new(backend, self.config.timeouts.ml()),
            None => MlScorer::unavailable(),
        };
        let audit: Arc<dyn AuditSink> = match self.audit {
            Some(audit) => audit,
            None => self.store.clone(),
        };

        let mut builder = FraudEngine::builder(self.config)
            .with_scorer(scorer)
            .with_audit_sink(audit);
        if let Some(text) = self.text {
            builder = builder.with_text_analyzer(text);
        }
        if let Some(geo) = self.geo {
            builder = builder.with_geo_distance(geo);
        }
        if let Some(vendor) = self.vendor {
            builder = builder.with_vendor_risk(vendor);
        }
        if let Some(weather) = self.weather {
            builder = builder.with_weather(weather);
        }

        TestEngine {
            engine: builder.build().expect("test engine config must be valid"),
            store: self.store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_builder_defaults() {
        let claim = TestClaimBuilder::new().build();
        assert_eq!(claim.claimant_id, "claimant-1");
        assert_eq!(claim.amount, dec!(500.00));
        assert!(!claim.is_new_bank);
    }

    #[test]
    fn test_random_claims_are_valid() {
        for _ in 0..10 {
            let claim = TestClaimBuilder::random().build();
            assert!(claim.validate().is_ok());
            assert!(!claim.notes.is_empty());
        }
    }
}
