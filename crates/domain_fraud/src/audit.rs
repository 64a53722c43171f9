//! Audit persistence
//!
//! Every scoring call produces one [`ScoringRecord`]. Records are
//! append-only and double as the claimant history for later calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::PortError;

use crate::claim::Claim;
use crate::engine::ScoringResult;
use crate::features::FraudFeatures;
use crate::history::{ClaimantHistory, HistoryStore, HistoryWindow};

/// Claim, features and result of one scoring call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRecord {
    pub claim: Claim,
    pub features: FraudFeatures,
    pub result: ScoringResult,
}

/// Write side of the claim store
#[async_trait]
pub trait AuditSink: HistoryStore {
    async fn persist(&self, record: &ScoringRecord) -> Result<(), PortError>;

    /// Gathers everything the rules need about a claimant
    ///
    /// The individual queries run concurrently; any failure fails the whole
    /// read and the engine substitutes an empty history.
    async fn history_for(&self, claimant_id: &str, window: &HistoryWindow) -> Result<ClaimantHistory, PortError> {
        let (repeat_count, prior_notes, prior_amount_avg, last_claim_at, registered_address) = futures::try_join!(
            self.count_recent_claims(claimant_id, window),
            self.recent_notes(claimant_id, window),
            self.average_amount(claimant_id, window),
            self.last_claim_before(claimant_id, window.until),
            self.registered_address(claimant_id),
        )?;

        Ok(ClaimantHistory {
            repeat_count,
            prior_notes,
            prior_amount_avg,
            last_claim_at,
            registered_address,
        })
    }
}
