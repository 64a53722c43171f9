//! PostgreSQL audit store
//!
//! Implements the fraud domain's [`HistoryStore`] and [`AuditSink`] ports
//! on top of [`ScoredClaimRepository`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_db::{connect, run_migrations, PgAuditStore, PoolSettings};
//!
//! let pool = connect("postgres://localhost/fraud", &PoolSettings::default()).await?;
//! run_migrations(&pool).await?;
//! let engine = FraudEngine::builder(config)
//!     .with_audit_sink(Arc::new(PgAuditStore::new(pool)))
//!     .build()?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_fraud::audit::{AuditSink, ScoringRecord};
use domain_fraud::history::{HistoryStore, HistoryWindow};

use crate::error::DatabaseError;
use crate::repositories::scored_claims::{NewScoredClaim, ScoredClaimRepository};

const ADAPTER_ID: &str = "postgres-audit-store";

/// PostgreSQL-backed claim store
///
/// Database errors reach the engine through `From<DatabaseError> for PortError`.
#[derive(Debug, Clone)]
pub struct PgAuditStore {
    repository: ScoredClaimRepository,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ScoredClaimRepository::new(pool),
        }
    }

    pub fn repository(&self) -> &ScoredClaimRepository {
        &self.repository
    }

    /// Records where a claimant lives, for the location check
    pub async fn register_address(&self, claimant_id: &str, address: &str) -> Result<(), PortError> {
        self.repository
            .upsert_address(claimant_id, address)
            .await
            .map_err(PortError::from)
    }
}

impl DomainPort for PgAuditStore {}

#[async_trait]
impl HealthCheckable for PgAuditStore {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.repository.pool())
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult::new(ADAPTER_ID, AdapterHealth::Healthy, latency_ms),
            Err(e) => HealthCheckResult::new(ADAPTER_ID, AdapterHealth::Unhealthy, latency_ms)
                .with_message(format!("Database error: {}", e)),
        }
    }
}

#[async_trait]
impl HistoryStore for PgAuditStore {
    async fn count_recent_claims(&self, claimant_id: &str, window: &HistoryWindow) -> Result<u32, PortError> {
        let count = self
            .repository
            .count_in_window(claimant_id, window.since, window.until)
            .await
            .map_err(PortError::from)?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn recent_notes(&self, claimant_id: &str, window: &HistoryWindow) -> Result<Vec<String>, PortError> {
        let limit = i64::try_from(window.notes_limit).unwrap_or(i64::MAX);
        self.repository
            .recent_notes(claimant_id, window.since, window.until, limit)
            .await
            .map_err(PortError::from)
    }

    async fn average_amount(&self, claimant_id: &str, window: &HistoryWindow) -> Result<Option<Decimal>, PortError> {
        self.repository
            .average_amount(claimant_id, window.since, window.until)
            .await
            .map_err(PortError::from)
    }

    async fn last_claim_before(
        &self,
        claimant_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, PortError> {
        self.repository
            .last_submitted_before(claimant_id, before)
            .await
            .map_err(PortError::from)
    }

    async fn registered_address(&self, claimant_id: &str) -> Result<Option<String>, PortError> {
        self.repository
            .registered_address(claimant_id)
            .await
            .map_err(PortError::from)
    }
}

#[async_trait]
impl AuditSink for PgAuditStore {
    #[instrument(skip(self, record), fields(scoring_id = %record.result.scoring_id))]
    async fn persist(&self, record: &ScoringRecord) -> Result<(), PortError> {
        let row = record_to_row(record).map_err(PortError::from)?;
        self.repository.insert(&row).await.map_err(PortError::from)?;
        debug!(claimant_id = %record.claim.claimant_id, "Scoring record stored");
        Ok(())
    }
}

fn record_to_row(record: &ScoringRecord) -> Result<NewScoredClaim, DatabaseError> {
    let claim = &record.claim;
    let result = &record.result;
    let report_delay_days = i32::try_from(claim.report_delay_days).map_err(|_| {
        DatabaseError::ConstraintViolation(format!("report_delay_days {} out of range", claim.report_delay_days))
    })?;

    Ok(NewScoredClaim {
        scoring_id: *result.scoring_id.as_uuid(),
        claim_id: *claim.claim_id.as_uuid(),
        claimant_id: claim.claimant_id.clone(),
        amount: claim.amount,
        report_delay_days,
        provider: claim.provider.clone(),
        notes: claim.notes.clone(),
        location: claim.location.clone(),
        is_new_bank: claim.is_new_bank,
        submitted_at: claim.timestamp,
        fraud_probability: result.fraud_probability,
        decision: result.decision.as_str().to_string(),
        alarms: serde_json::to_value(&result.alarms)?,
        features: serde_json::to_value(record.features)?,
        explanation: result.explanation.clone(),
        score_source: result.score_source.as_str().to_string(),
        degraded: result.degraded,
        scored_at: result.timestamp,
    })
}
