//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the fraud engine using SQLx: an append-only
//! log of scoring records that doubles as the claimant history the rules
//! read, plus registered claimant addresses.
//!
//! # Architecture
//!
//! Repositories own the SQL; adapters implement the domain ports on top of
//! them and translate errors into `PortError`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{connect, run_migrations, PgAuditStore, PoolSettings};
//!
//! let pool = connect("postgres://localhost/fraud", &PoolSettings::default()).await?;
//! run_migrations(&pool).await?;
//! let store = PgAuditStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use pool::{connect, run_migrations, DatabasePool, PoolSettings};
pub use error::DatabaseError;
pub use adapters::PgAuditStore;
pub use repositories::{ScoredClaimRepository, ScoredClaimRow};
