//! ML probability scoring
//!
//! [`MlScorer`] is an explicit value handed to the engine at construction.
//! It wraps exactly one [`ProbabilityBackend`] chosen once from
//! configuration, so callers never branch on which backend is active.
//!
//! Whenever the backend cannot produce a usable probability (not ready,
//! error, timeout, non-finite output) the scorer answers with the fallback
//! heuristic `min(1.0, num_alarms * 0.10)` and marks the outcome degraded.

mod local;
mod remote;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable};

use crate::config::ScorerConfig;
use crate::error::ScoringError;
use crate::features::{FraudFeatures, FEATURE_COUNT};

pub use local::{BinaryClassifier, LocalModel, LogisticModel};
pub use remote::RemoteEndpoint;

/// Probability added per alarm by the fallback heuristic
pub const FALLBACK_WEIGHT_PER_ALARM: f64 = 0.10;

/// Where a probability came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    LocalModel,
    RemoteEndpoint,
    Fallback,
}

impl ScoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreSource::LocalModel => "local_model",
            ScoreSource::RemoteEndpoint => "remote_endpoint",
            ScoreSource::Fallback => "fallback",
        }
    }
}

/// A model that maps a feature vector to a fraud probability
#[async_trait]
pub trait ProbabilityBackend: Send + Sync {
    fn source(&self) -> ScoreSource;

    async fn is_ready(&self) -> bool;

    async fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Result<f64, ScoringError>;
}

/// Backend used when nothing is configured or loading failed
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

#[async_trait]
impl ProbabilityBackend for Unavailable {
    fn source(&self) -> ScoreSource {
        ScoreSource::Fallback
    }

    async fn is_ready(&self) -> bool {
        false
    }

    async fn predict_proba(&self, _features: &[f64; FEATURE_COUNT]) -> Result<f64, ScoringError> {
        Err(ScoringError::NotLoaded)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    /// Always within [0, 1]
    pub probability: f64,
    pub source: ScoreSource,
    pub degraded: bool,
    pub fallback_reason: Option<String>,
}

/// `min(1.0, num_alarms * 0.10)`
pub fn fallback_probability(num_alarms: usize) -> f64 {
    (num_alarms as f64 * FALLBACK_WEIGHT_PER_ALARM).min(1.0)
}

#[derive(Clone)]
pub struct MlScorer {
    backend: Arc<dyn ProbabilityBackend>,
    timeout: Duration,
}

impl MlScorer {
    pub fn new(backend: Arc<dyn ProbabilityBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// A scorer that always answers with the fallback heuristic
    pub fn unavailable() -> Self {
        Self::new(Arc::new(Unavailable), Duration::from_secs(1))
    }

    /// Chooses the backend: a local model artifact if it loads, otherwise a
    /// remote endpoint if configured, otherwise the fallback only
    pub fn from_config(config: &ScorerConfig, timeout: Duration) -> Self {
        if let Some(path) = config.model_path.as_deref().filter(|p| !p.is_empty()) {
            match LocalModel::from_path(path) {
                Ok(model) => {
                    info!(path, "Scoring with local model");
                    return Self::new(Arc::new(model), timeout);
                }
                Err(error) => {
                    warn!(path, error = %error, "Failed to load local model");
                }
            }
        }

        if let Some(url) = config.inference_endpoint.as_deref().filter(|u| !u.is_empty()) {
            match RemoteEndpoint::new(url, timeout, config.circuit_breaker.clone()) {
                Ok(remote) => {
                    info!(url, "Scoring with remote inference endpoint");
                    return Self::new(Arc::new(remote), timeout);
                }
                Err(error) => {
                    warn!(url, error = %error, "Failed to build inference client");
                }
            }
        }

        warn!("No probability backend available, scoring with the fallback heuristic");
        Self::new(Arc::new(Unavailable), timeout)
    }

    pub fn backend_source(&self) -> ScoreSource {
        self.backend.source()
    }

    pub async fn is_ready(&self) -> bool {
        self.backend.is_ready().await
    }

    /// Scores a feature vector, never failing
    pub async fn score(&self, features: &FraudFeatures) -> ScoreOutcome {
        if !self.backend.is_ready().await {
            return Self::fallback(features, "model backend not ready");
        }

        let vector = features.to_array();
        match tokio::time::timeout(self.timeout, self.backend.predict_proba(&vector)).await {
            Ok(Ok(p)) if p.is_finite() => ScoreOutcome {
                probability: p.clamp(0.0, 1.0),
                source: self.backend.source(),
                degraded: false,
                fallback_reason: None,
            },
            Ok(Ok(_)) => {
                warn!(source = self.backend.source().as_str(), "Backend returned a non-finite probability");
                Self::fallback(features, ScoringError::NonFinite.to_string())
            }
            Ok(Err(error)) => {
                warn!(source = self.backend.source().as_str(), error = %error, "Backend scoring failed");
                Self::fallback(features, error.to_string())
            }
            Err(_) => {
                warn!(
                    source = self.backend.source().as_str(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Backend scoring timed out"
                );
                Self::fallback(features, "model backend timed out")
            }
        }
    }

    /// The heuristic outcome for `features`
    pub fn fallback(features: &FraudFeatures, reason: impl Into<String>) -> ScoreOutcome {
        ScoreOutcome {
            probability: fallback_probability(features.alarm_count()),
            source: ScoreSource::Fallback,
            degraded: true,
            fallback_reason: Some(reason.into()),
        }
    }
}

#[async_trait]
impl HealthCheckable for MlScorer {
    async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let ready = self.backend.is_ready().await;
        let latency_ms = started.elapsed().as_millis() as u64;
        let adapter_id = format!("ml_scorer:{}", self.backend.source().as_str());

        if ready {
            HealthCheckResult::new(adapter_id, AdapterHealth::Healthy, latency_ms)
        } else {
            HealthCheckResult::new(adapter_id, AdapterHealth::Degraded, latency_ms)
                .with_message("probability backend unavailable, fallback heuristic active")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    #[async_trait]
    impl ProbabilityBackend for Fixed {
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

    fn features_with_alarms(n: usize) -> FraudFeatures {
        FraudFeatures {
            num_alarms: n as f64,
            ..Default::default()
        }
    }

    #[test]
    fn test_fallback_probability_caps_at_one() {
        assert_eq!(fallback_probability(0), 0.0);
        assert_eq!(fallback_probability(4), 4.0 * 0.10);
        assert_eq!(fallback_probability(13), 1.0);
    }

    #[tokio::test]
    async fn test_unavailable_backend_falls_back() {
        let outcome = MlScorer::unavailable().score(&features_with_alarms(2)).await;
        assert_eq!(outcome.source, ScoreSource::Fallback);
        assert!(outcome.degraded);
        assert_eq!(outcome.probability, fallback_probability(2));
    }

    #[tokio::test]
    async fn test_out_of_range_output_is_clamped() {
        let scorer = MlScorer::new(Arc::new(Fixed(1.7)), Duration::from_secs(1));
        let outcome = scorer.score(&features_with_alarms(0)).await;
        assert_eq!(outcome.probability, 1.0);
        assert!(!outcome.degraded);
    }

    #[tokio::test]
    async fn test_nan_output_falls_back() {
        let scorer = MlScorer::new(Arc::new(Fixed(f64::NAN)), Duration::from_secs(1));
        let outcome = scorer.score(&features_with_alarms(1)).await;
        assert_eq!(outcome.source, ScoreSource::Fallback);
        assert_eq!(outcome.probability, 0.1);
    }

    #[test]
    fn test_from_config_without_backends_is_unavailable() {
        let scorer = MlScorer::from_config(&ScorerConfig::default(), Duration::from_secs(1));
        assert_eq!(scorer.backend_source(), ScoreSource::Fallback);
    }

    #[tokio::test]
    async fn test_health_reports_degraded_without_backend() {
        let result = MlScorer::unavailable().health_check().await;
        assert_eq!(result.status, AdapterHealth::Degraded);
        assert_eq!(result.adapter_id, "ml_scorer:fallback");
    }
}
