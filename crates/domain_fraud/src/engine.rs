//! Scoring pipeline
//!
//! ```text
//! Claim -> validate -> history -> signals -> rules -> features
//!       -> ML score (bounded by the scoring deadline) -> decision
//!       -> ScoringResult, persisted in the background
//! ```
//!
//! A scoring call only fails on an invalid claim. Every other failure
//! (history, signals, rules, model, persistence) degrades to a documented
//! default and is logged.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use core_kernel::ScoringId;

use crate::adapters::{BlacklistVendorRisk, InMemoryAuditStore, NullWeatherLookup};
use crate::alarm::Alarm;
use crate::audit::{AuditSink, ScoringRecord};
use crate::claim::Claim;
use crate::config::EngineConfig;
use crate::decision::{Decision, DecisionPolicy, RiskLevel};
use crate::error::FraudError;
use crate::explain::{AlarmCatalog, AlarmExplanation};
use crate::features::{FeatureExtractor, FraudFeatures};
use crate::history::{ClaimantHistory, HistoryWindow};
use crate::rules::RuleEvaluator;
use crate::scoring::{MlScorer, ScoreSource};
use crate::signals::{
    GazetteerGeoDistance, GeoDistance, KeywordTextAnalyzer, SignalGateway, SignalKind, TextAnalyzer,
    VendorRisk, WeatherLookup,
};

/// Result of one scoring call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub scoring_id: ScoringId,
    pub claimant_id: String,
    /// Within [0, 1]
    pub fraud_probability: f64,
    pub decision: Decision,
    /// In evaluation order
    pub alarms: Vec<Alarm>,
    pub explanation: String,
    pub timestamp: DateTime<Utc>,
    /// True when the probability came from the fallback heuristic
    pub degraded: bool,
    pub score_source: ScoreSource,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable_signals: Vec<SignalKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features_used: Option<FraudFeatures>,
}

/// Aggregate counts over a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub approved: usize,
    pub review: usize,
    pub rejected: usize,
    pub avg_probability: f64,
    pub degraded: usize,
}

impl BatchSummary {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a ScoringResult>) -> Self {
        let mut summary = BatchSummary::default();
        let mut probability_sum = 0.0;
        for result in results {
            summary.total += 1;
            probability_sum += result.fraud_probability;
            match result.decision {
                Decision::Approve => summary.approved += 1,
                Decision::Review => summary.review += 1,
                Decision::Reject => summary.rejected += 1,
            }
            if result.degraded {
                summary.degraded += 1;
            }
        }
        if summary.total > 0 {
            summary.avg_probability = probability_sum / summary.total as f64;
        }
        summary
    }
}

pub struct FraudEngine {
    config: EngineConfig,
    gateway: SignalGateway,
    evaluator: RuleEvaluator,
    extractor: FeatureExtractor,
    scorer: MlScorer,
    policy: DecisionPolicy,
    audit: Arc<dyn AuditSink>,
    catalog: AlarmCatalog,
}

impl FraudEngine {
    pub fn builder(config: EngineConfig) -> FraudEngineBuilder {
        FraudEngineBuilder::new(config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scorer(&self) -> &MlScorer {
        &self.scorer
    }

    pub fn audit(&self) -> Arc<dyn AuditSink> {
        Arc::clone(&self.audit)
    }

    /// Scores a claim within the configured deadline
    pub async fn score(&self, claim: &Claim) -> Result<ScoringResult, FraudError> {
        self.score_with_deadline(claim, self.config.timeouts.scoring_deadline()).await
    }

    /// Scores a claim, finishing with the fallback heuristic if `budget` runs out
    pub async fn score_with_deadline(&self, claim: &Claim, budget: Duration) -> Result<ScoringResult, FraudError> {
        claim.validate()?;
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + budget;

        let window = HistoryWindow::ending_at(
            claim.timestamp,
            self.config.history_window_days,
            self.config.prior_notes_limit,
        );
        let history = self.load_history(claim, &window).await;

        let default_address = &self.config.rules.default_registered_address;
        let signals = self
            .gateway
            .collect(claim, &history, default_address, deadline)
            .await;

        let alarms = self.evaluator.evaluate(claim, &signals, &history);
        let features = self.extractor.extract(claim, &alarms, &signals, &history);

        let outcome = match tokio::time::timeout_at(deadline, self.scorer.score(&features)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(claimant_id = %claim.claimant_id, "Scoring deadline reached, using fallback probability");
                MlScorer::fallback(&features, "scoring deadline exceeded")
            }
        };

        let (decision, explanation) = self.policy.decide(outcome.probability, &alarms);
        let explanation = format!(
            "Fraud analysis complete for claim of ${:.2} from claimant {}. {explanation}",
            claim.amount, claim.claimant_id
        );

        let result = ScoringResult {
            scoring_id: ScoringId::new(),
            claimant_id: claim.claimant_id.clone(),
            fraud_probability: outcome.probability,
            decision,
            alarms,
            explanation,
            timestamp: Utc::now(),
            degraded: outcome.degraded,
            score_source: outcome.source,
            risk_level: RiskLevel::from_probability(outcome.probability),
            recommendation: decision.recommendation().map(str::to_string),
            unavailable_signals: signals.unavailable.clone(),
            features_used: self.config.include_features.then_some(features),
        };

        info!(
            scoring_id = %result.scoring_id,
            claimant_id = %result.claimant_id,
            probability = result.fraud_probability,
            decision = %result.decision,
            alarms = result.alarms.len(),
            source = result.score_source.as_str(),
            degraded = result.degraded,
            duration_ms = started.elapsed().as_millis() as u64,
            "Claim scored"
        );

        self.persist_in_background(ScoringRecord {
            claim: claim.clone(),
            features,
            result: result.clone(),
        });

        Ok(result)
    }

    /// Scores claims with bounded concurrency, preserving input order
    pub async fn score_batch(&self, claims: Vec<Claim>) -> Vec<Result<ScoringResult, FraudError>> {
        futures::stream::iter(claims)
            .map(|claim| async move { self.score(&claim).await })
            .buffered(self.config.batch_concurrency.max(1))
            .collect()
            .await
    }

    pub fn explain(&self, alarm_type: &str) -> Result<AlarmExplanation, FraudError> {
        self.catalog
            .explain(alarm_type)
            .ok_or_else(|| FraudError::UnknownAlarmType(alarm_type.to_string()))
    }

    pub fn alarm_catalog(&self) -> &AlarmCatalog {
        &self.catalog
    }

    async fn load_history(&self, claim: &Claim, window: &HistoryWindow) -> ClaimantHistory {
        let limit = self.config.timeouts.history();
        match tokio::time::timeout(limit, self.audit.history_for(&claim.claimant_id, window)).await {
            Ok(Ok(history)) => history,
            Ok(Err(error)) => {
                warn!(claimant_id = %claim.claimant_id, error = %error, "History unavailable, scoring without it");
                ClaimantHistory::default()
            }
            Err(_) => {
                warn!(
                    claimant_id = %claim.claimant_id,
                    timeout_ms = limit.as_millis() as u64,
                    "History lookup timed out, scoring without it"
                );
                ClaimantHistory::default()
            }
        }
    }

    fn persist_in_background(&self, record: ScoringRecord) {
        let audit = Arc::clone(&self.audit);
        tokio::spawn(async move {
            if let Err(error) = audit.persist(&record).await {
                error!(
                    scoring_id = %record.result.scoring_id,
                    claimant_id = %record.claim.claimant_id,
                    error = %error,
                    "Failed to persist scoring record"
                );
            }
        });
    }
}

/// Assembles a [`FraudEngine`], defaulting every unset collaborator
///
/// Defaults: keyword text analysis, gazetteer distances, blacklist-only
/// vendor risk, no weather data, in-memory audit store, and a scorer built
/// from `config.scorer`.
pub struct FraudEngineBuilder {
    config: EngineConfig,
    text: Option<Arc<dyn TextAnalyzer>>,
    geo: Option<Arc<dyn GeoDistance>>,
    vendor: Option<Arc<dyn VendorRisk>>,
    weather: Option<Arc<dyn WeatherLookup>>,
    audit: Option<Arc<dyn AuditSink>>,
    scorer: Option<MlScorer>,
}

impl FraudEngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            text: None,
            geo: None,
            vendor: None,
            weather: None,
            audit: None,
            scorer: None,
        }
    }

    pub fn with_text_analyzer(mut self, text: Arc<dyn TextAnalyzer>) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_geo_distance(mut self, geo: Arc<dyn GeoDistance>) -> Self {
        self.geo = Some(geo);
        self
    }

    pub fn with_vendor_risk(mut self, vendor: Arc<dyn VendorRisk>) -> Self {
        self.vendor = Some(vendor);
        self
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherLookup>) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_scorer(mut self, scorer: MlScorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn build(self) -> Result<FraudEngine, FraudError> {
        self.config.validate()?;
        let config = self.config;

        let gateway = SignalGateway::new(
            self.text.unwrap_or_else(|| Arc::new(KeywordTextAnalyzer::new())),
            self.geo.unwrap_or_else(|| Arc::new(GazetteerGeoDistance::new())),
            self.vendor
                .unwrap_or_else(|| Arc::new(BlacklistVendorRisk::new(config.rules.blacklist.clone()))),
            self.weather.unwrap_or_else(|| Arc::new(NullWeatherLookup)),
            config.timeouts.signal(),
        );
        let scorer = self
            .scorer
            .unwrap_or_else(|| MlScorer::from_config(&config.scorer, config.timeouts.ml()));

        Ok(FraudEngine {
            gateway,
            evaluator: RuleEvaluator::standard(config.rules.clone()),
            extractor: FeatureExtractor,
            scorer,
            policy: DecisionPolicy::new(config.decision.clone()),
            audit: self.audit.unwrap_or_else(|| Arc::new(InMemoryAuditStore::new())),
            catalog: AlarmCatalog::new(config.rules.clone()),
            config,
        })
    }
}
