//! Core Kernel - Foundational types shared by the fraud engine crates
//!
//! This crate provides the building blocks used by the domain, infrastructure
//! and interface layers:
//! - Strongly-typed identifiers for scoring events and claims
//! - The common error types
//! - Port plumbing (adapter errors, health checks, circuit breaker settings)

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{ScoringId, ClaimId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
    CircuitBreakerConfig,
};
