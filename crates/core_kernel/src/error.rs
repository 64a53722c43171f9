//! Kernel errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Settings that would make scoring inconsistent
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid {kind} identifier '{value}'")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        #[source]
        source: uuid::Error,
    },
}

impl CoreError {
    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }
}
