//! Repository implementations
//!
//! Repositories own the SQL. Adapters translate between repository rows and
//! domain values.

pub mod scored_claims;

pub use scored_claims::{NewScoredClaim, ScoredClaimRepository, ScoredClaimRow};
