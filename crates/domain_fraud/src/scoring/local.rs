//! In-process model backend

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::ScoringError;
use crate::features::{FEATURE_COUNT, FEATURE_NAMES};

use super::{ProbabilityBackend, ScoreSource};

/// Any binary classifier exposing a positive-class probability
pub trait BinaryClassifier: Send + Sync {
    fn predict_proba(&self, features: &[f64]) -> Result<f64, ScoringError>;

    fn version(&self) -> &str;
}

/// Logistic regression over the 14 fraud features
///
/// Loaded from a JSON artifact:
///
/// ```json
/// {
///   "version": "2024-06-01",
///   "feature_names": ["amount_normalized", "..."],
///   "coefficients": [0.8, "..."],
///   "intercept": -2.1
/// }
/// ```
///
/// When `feature_names` is present it must match the extractor's slot order.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModel {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64, version: impl Into<String>) -> Result<Self, ScoringError> {
        let model = Self {
            version: version.into(),
            feature_names: Vec::new(),
            coefficients,
            intercept,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self, ScoringError> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| ScoringError::Artifact(format!("invalid model JSON: {e}")))?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScoringError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ScoringError::Artifact(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), ScoringError> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ScoringError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: self.coefficients.len(),
            });
        }
        if !self.feature_names.is_empty() && self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ScoringError::Artifact(
                "feature_names do not match the extractor's slot order".to_string(),
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ScoringError::Artifact("model parameters must be finite".to_string()));
        }
        Ok(())
    }
}

impl BinaryClassifier for LogisticModel {
    fn predict_proba(&self, features: &[f64]) -> Result<f64, ScoringError> {
        if features.len() != self.coefficients.len() {
            return Err(ScoringError::ShapeMismatch {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }
        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>();
        Ok(1.0 / (1.0 + (-z).exp()))
    }

    fn version(&self) -> &str {
        &self.version
    }
}

/// Backend holding an optional loaded classifier
///
/// The classifier can be swapped at runtime with [`LocalModel::load`] and
/// dropped with [`LocalModel::unload`]; an unloaded model reports not ready
/// and the scorer falls back.
pub struct LocalModel {
    classifier: RwLock<Option<Arc<dyn BinaryClassifier>>>,
}

impl LocalModel {
    pub fn with_classifier(classifier: Arc<dyn BinaryClassifier>) -> Self {
        Self {
            classifier: RwLock::new(Some(classifier)),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScoringError> {
        let model = LogisticModel::from_path(path)?;
        Ok(Self::with_classifier(Arc::new(model)))
    }

    /// Replaces the current classifier with the artifact at `path`
    ///
    /// On error the previously loaded classifier stays in place.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<(), ScoringError> {
        let model = LogisticModel::from_path(path)?;
        info!(version = %model.version, "Local model loaded");
        *self.classifier.write().await = Some(Arc::new(model));
        Ok(())
    }

    pub async fn unload(&self) {
        *self.classifier.write().await = None;
        info!("Local model unloaded");
    }

    pub async fn version(&self) -> Option<String> {
        self.classifier.read().await.as_ref().map(|c| c.version().to_string())
    }
}

#[async_trait]
impl ProbabilityBackend for LocalModel {
    fn source(&self) -> ScoreSource {
        ScoreSource::LocalModel
    }

    async fn is_ready(&self) -> bool {
        self.classifier.read().await.is_some()
    }

    async fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Result<f64, ScoringError> {
        let classifier = self
            .classifier
            .read()
            .await
            .clone()
            .ok_or(ScoringError::NotLoaded)?;
        classifier.predict_proba(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_model(intercept: f64) -> LogisticModel {
        LogisticModel::new(vec![0.0; FEATURE_COUNT], intercept, "test").unwrap()
    }

    #[test]
    fn test_zero_intercept_is_half() {
        let p = zero_model(0.0).predict_proba(&[1.0; FEATURE_COUNT]).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        assert!(matches!(
            LogisticModel::new(vec![0.1; 3], 0.0, "bad"),
            Err(ScoringError::ShapeMismatch { expected: 14, actual: 3 })
        ));
    }

    #[test]
    fn test_json_with_wrong_feature_names_rejected() {
        let json = serde_json::json!({
            "feature_names": vec!["x"; FEATURE_COUNT],
            "coefficients": vec![0.0; FEATURE_COUNT],
            "intercept": 0.0
        })
        .to_string();
        assert!(matches!(LogisticModel::from_json(&json), Err(ScoringError::Artifact(_))));
    }

    #[tokio::test]
    async fn test_unload_makes_backend_not_ready() {
        let backend = LocalModel::with_classifier(Arc::new(zero_model(-1.0)));
        assert!(backend.is_ready().await);
        assert_eq!(backend.version().await.as_deref(), Some("test"));

        backend.unload().await;
        assert!(!backend.is_ready().await);
        assert!(matches!(
            backend.predict_proba(&[0.0; FEATURE_COUNT]).await,
            Err(ScoringError::NotLoaded)
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file_keeps_previous_model() {
        let backend = LocalModel::with_classifier(Arc::new(zero_model(0.0)));
        assert!(backend.load("/nonexistent/model.json").await.is_err());
        assert!(backend.is_ready().await);
    }
}
