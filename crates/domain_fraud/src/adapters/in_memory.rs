//! In-memory audit store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use core_kernel::{DomainPort, PortError};

use crate::audit::{AuditSink, ScoringRecord};
use crate::history::{HistoryStore, HistoryWindow};

/// Append-only store used when no database is configured, and in tests
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    records: RwLock<Vec<ScoringRecord>>,
    addresses: RwLock<HashMap<String, String>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_address(&self, claimant_id: impl Into<String>, address: impl Into<String>) {
        self.addresses.write().await.insert(claimant_id.into(), address.into());
    }

    pub async fn records(&self) -> Vec<ScoringRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

/// Records of `claimant_id` inside `window`, borrowed from the store
fn in_window<'a>(
    records: &'a [ScoringRecord],
    claimant_id: &'a str,
    window: &'a HistoryWindow,
) -> impl Iterator<Item = &'a ScoringRecord> + 'a {
    records
        .iter()
        .filter(move |r| r.claim.claimant_id == claimant_id && window.contains(r.claim.timestamp))
}

impl DomainPort for InMemoryAuditStore {}

#[async_trait]
impl HistoryStore for InMemoryAuditStore {
    async fn count_recent_claims(&self, claimant_id: &str, window: &HistoryWindow) -> Result<u32, PortError> {
        let records = self.records.read().await;
        Ok(in_window(&records, claimant_id, window).count() as u32)
    }

    async fn recent_notes(&self, claimant_id: &str, window: &HistoryWindow) -> Result<Vec<String>, PortError> {
        let records = self.records.read().await;
        let mut notes: Vec<(DateTime<Utc>, &str)> = in_window(&records, claimant_id, window)
            .filter(|r| !r.claim.notes.is_empty())
            .map(|r| (r.claim.timestamp, r.claim.notes.as_str()))
            .collect();
        notes.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(notes
            .into_iter()
            .take(window.notes_limit)
            .map(|(_, n)| n.to_string())
            .collect())
    }

    async fn average_amount(&self, claimant_id: &str, window: &HistoryWindow) -> Result<Option<Decimal>, PortError> {
        let records = self.records.read().await;
        let (count, total) = in_window(&records, claimant_id, window)
            .fold((0u32, Decimal::ZERO), |(count, total), r| (count + 1, total + r.claim.amount));
        Ok((count > 0).then(|| total / Decimal::from(count)))
    }

    async fn last_claim_before(
        &self,
        claimant_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, PortError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.claim.claimant_id == claimant_id && r.claim.timestamp < before)
            .map(|r| r.claim.timestamp)
            .max())
    }

    async fn registered_address(&self, claimant_id: &str) -> Result<Option<String>, PortError> {
        Ok(self.addresses.read().await.get(claimant_id).cloned())
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditStore {
    async fn persist(&self, record: &ScoringRecord) -> Result<(), PortError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}
