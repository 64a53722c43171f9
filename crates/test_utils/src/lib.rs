//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! fraud engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built claims, timestamps and engine settings
//! - `builders`: Builder patterns for claims and engines under test
//! - `stubs`: Deterministic, failing and slow port implementations
//! - `database`: Database test helpers and container management
//! - `assertions`: Custom assertion helpers for scoring results
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod stubs;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use stubs::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
