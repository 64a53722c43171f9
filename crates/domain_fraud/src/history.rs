//! Per-claimant history
//!
//! History is read before rule evaluation and may lag behind writes from
//! concurrent scoring calls; checks treat it as best-effort.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, PortError};

/// Time range of prior claims considered for one scoring call
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryWindow {
    pub since: DateTime<Utc>,
    /// Exclusive upper bound, normally the claim's own timestamp
    pub until: DateTime<Utc>,
    pub notes_limit: usize,
}

impl HistoryWindow {
    pub fn ending_at(until: DateTime<Utc>, days: i64, notes_limit: usize) -> Self {
        Self {
            since: until - Duration::days(days),
            until,
            notes_limit,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.since && at < self.until
    }
}

/// What the store knows about a claimant at scoring time
///
/// `Default` is the "no history" value used when the store is empty,
/// slow or failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimantHistory {
    /// Prior claims inside the window
    pub repeat_count: u32,
    /// Most recent notes first
    pub prior_notes: Vec<String>,
    pub prior_amount_avg: Option<Decimal>,
    pub last_claim_at: Option<DateTime<Utc>>,
    pub registered_address: Option<String>,
}

/// Read side of the claim store
#[async_trait]
pub trait HistoryStore: DomainPort {
    async fn count_recent_claims(&self, claimant_id: &str, window: &HistoryWindow) -> Result<u32, PortError>;

    async fn recent_notes(&self, claimant_id: &str, window: &HistoryWindow) -> Result<Vec<String>, PortError>;

    /// `None` when there are no prior claims in the window
    async fn average_amount(&self, claimant_id: &str, window: &HistoryWindow) -> Result<Option<Decimal>, PortError>;

    async fn last_claim_before(
        &self,
        claimant_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, PortError>;

    async fn registered_address(&self, claimant_id: &str) -> Result<Option<String>, PortError>;
}
