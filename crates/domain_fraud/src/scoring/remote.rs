//! Remote inference backend

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{CircuitBreakerConfig, PortError};

use crate::adapters::circuit_breaker::CircuitBreaker;
use crate::adapters::http::{map_status, map_transport_error};
use crate::error::ScoringError;
use crate::features::{FEATURE_COUNT, FEATURE_NAMES};

use super::{ProbabilityBackend, ScoreSource};

const SERVICE: &str = "inference_endpoint";

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    feature_names: &'a [&'static str],
    features: &'a [f64],
}

/// Accepts `{"probability": p}` or `{"predictions": [p, ...]}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Single { probability: f64 },
    Batch { predictions: Vec<f64> },
}

/// POSTs feature vectors to an inference service
///
/// Guarded by a circuit breaker: while the circuit is open the backend
/// reports not ready and the scorer falls back without waiting on the
/// network.
pub struct RemoteEndpoint {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    breaker: CircuitBreaker,
}

impl RemoteEndpoint {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        circuit_breaker: CircuitBreakerConfig,
    ) -> Result<Self, ScoringError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoringError::Remote(PortError::internal(format!("client build failed: {e}"))))?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
            breaker: CircuitBreaker::new(SERVICE, circuit_breaker),
        })
    }

    async fn call(&self, features: &[f64; FEATURE_COUNT]) -> Result<f64, PortError> {
        let timeout_ms = self.timeout.as_millis() as u64;
        let response = self
            .client
            .post(&self.url)
            .json(&InferenceRequest {
                feature_names: &FEATURE_NAMES,
                features,
            })
            .send()
            .await
            .map_err(|e| map_transport_error(SERVICE, e, timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status(SERVICE, status));
        }

        let body: InferenceResponse = response
            .json()
            .await
            .map_err(|e| map_transport_error(SERVICE, e, timeout_ms))?;

        match body {
            InferenceResponse::Single { probability } => Ok(probability),
            InferenceResponse::Batch { predictions } => predictions
                .first()
                .copied()
                .ok_or_else(|| PortError::transformation("empty predictions array")),
        }
    }
}

#[async_trait]
impl ProbabilityBackend for RemoteEndpoint {
    fn source(&self) -> ScoreSource {
        ScoreSource::RemoteEndpoint
    }

    async fn is_ready(&self) -> bool {
        self.breaker.is_available().await
    }

    async fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Result<f64, ScoringError> {
        match self.call(features).await {
            Ok(p) => {
                self.breaker.record_success();
                debug!(probability = p, "Remote inference succeeded");
                Ok(p)
            }
            Err(error) => {
                if error.is_transient() {
                    self.breaker.record_failure().await;
                }
                Err(ScoringError::Remote(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shapes() {
        let single: InferenceResponse = serde_json::from_str(r#"{"probability": 0.42}"#).unwrap();
        assert!(matches!(single, InferenceResponse::Single { probability } if probability == 0.42));

        let batch: InferenceResponse = serde_json::from_str(r#"{"predictions": [0.9, 0.1]}"#).unwrap();
        assert!(matches!(batch, InferenceResponse::Batch { ref predictions } if predictions[0] == 0.9));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_errors() {
        let remote = RemoteEndpoint::new(
            "http://127.0.0.1:9/score",
            Duration::from_millis(200),
            CircuitBreakerConfig::default(),
        )
        .unwrap();
        assert!(remote.is_ready().await);
        assert!(remote.predict_proba(&[0.0; FEATURE_COUNT]).await.is_err());
    }
}
