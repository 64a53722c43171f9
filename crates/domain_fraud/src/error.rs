//! Fraud domain errors

use thiserror::Error;

use core_kernel::{CoreError, PortError};

/// Errors surfaced to callers of the fraud engine
///
/// Only validation problems and misconfiguration reach the caller; signal,
/// rule and scoring failures degrade to defaults inside the engine.
#[derive(Debug, Error)]
pub enum FraudError {
    #[error("Invalid claim: {0}")]
    Validation(String),

    #[error("Unknown alarm type: {0}")]
    UnknownAlarmType(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl FraudError {
    pub fn validation(message: impl Into<String>) -> Self {
        FraudError::Validation(message.into())
    }
}

/// Failure inside a single alarm check
///
/// Logged by the evaluator and treated as "no alarm".
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("{rule}: invalid value: {message}")]
    InvalidValue { rule: &'static str, message: String },
}

/// Failure of a probability backend
///
/// Never returned from the engine: the scorer falls back on any of these.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Model is not loaded")]
    NotLoaded,

    #[error("Model artifact error: {0}")]
    Artifact(String),

    #[error("Feature vector has {actual} values, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Backend returned a non-finite probability")]
    NonFinite,

    #[error("Remote inference failed: {0}")]
    Remote(#[from] PortError),
}
