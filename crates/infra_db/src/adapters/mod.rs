//! Domain Adapters
//!
//! Adapter implementations for the fraud domain's ports, connecting them to
//! the PostgreSQL database layer.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PgAuditStore;
//! use domain_fraud::HistoryStore;
//!
//! let store = PgAuditStore::new(pool);
//! let prior = store.count_recent_claims("claimant-1", &window).await?;
//! ```

pub mod audit;

pub use audit::PgAuditStore;
