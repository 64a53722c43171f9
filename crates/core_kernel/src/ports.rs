//! Ports and Adapters Infrastructure
//!
//! Shared plumbing for the capability traits the fraud domain depends on.
//! Each signal provider, history store and inference backend is a port: the
//! domain defines the trait, and adapters (in-memory, PostgreSQL, HTTP)
//! implement it.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               FraudEngine                    │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │   Port Traits (TextAnalyzer, VendorRisk,     │
//! │   WeatherLookup, HistoryStore, AuditSink)    │
//! └──────────────────────────────────────────────┘
//!          ▲                          ▲
//!  ┌───────┴────────┐        ┌────────┴─────────┐
//!  │ Internal       │        │ External         │
//!  │ (memory / PG)  │        │ (REST services)  │
//!  └────────────────┘        └──────────────────┘
//! ```
//!
//! Every port returns [`PortError`] so the engine can treat failures from any
//! adapter uniformly: log, then fall back to the documented default.

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The adapter rejected the input, e.g. a duplicate scoring id
    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// HTTP 429 from a remote provider
    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u64,
    },

    /// The external system is unavailable or its circuit is open
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// The remote payload could not be mapped into a domain value
    #[error("Transformation error: {message}")]
    Transformation {
        message: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Timeout error for an operation bounded by `limit`
    pub fn timeout(operation: impl Into<String>, limit: Duration) -> Self {
        PortError::Timeout {
            operation: operation.into(),
            duration_ms: limit.as_millis() as u64,
        }
    }

    pub fn unavailable(service: impl Into<String>) -> Self {
        PortError::ServiceUnavailable {
            service: service.into(),
        }
    }

    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::RateLimited { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared across concurrently running scoring calls, so they must
/// be thread-safe and usable from spawned tasks.
pub trait DomainPort: Send + Sync + 'static {}

/// When a remote adapter stops calling its service
///
/// ```rust
/// use core_kernel::CircuitBreakerConfig;
///
/// let config: CircuitBreakerConfig = serde_json::from_str(r#"{"failure_threshold": 2}"#).unwrap();
/// assert_eq!(config.failure_threshold, 2);
/// assert_eq!(config.reset_timeout().as_secs(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Seconds an open circuit waits before letting a probe through
    pub reset_timeout_secs: u64,
    /// Consecutive probe successes that close it again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_secs: 30,
            success_threshold: 3,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn reset_timeout(&self) -> Duration {
        Duration::from_secs(self.reset_timeout_secs)
    }
}

/// Adapter health, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    /// Answering through a fallback path
    Degraded,
    Unhealthy,
}

impl AdapterHealth {
    /// The worst status among `checks`; healthy when there are none
    pub fn overall<'a>(checks: impl IntoIterator<Item = &'a HealthCheckResult>) -> Self {
        checks
            .into_iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(AdapterHealth::Healthy)
    }
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    /// Latency of the health check in milliseconds
    pub latency_ms: u64,
    pub message: Option<String>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    /// Creates a result stamped with the current time
    pub fn new(adapter_id: impl Into<String>, status: AdapterHealth, latency_ms: u64) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status,
            latency_ms,
            message: None,
            checked_at: chrono::Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Trait for adapters that support health checks
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}
