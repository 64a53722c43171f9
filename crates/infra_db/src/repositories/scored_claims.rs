//! Scored claims repository
//!
//! Append-only storage for scoring records and the per-claimant history
//! queries the fraud rules read.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for scored claims and claimant addresses
#[derive(Debug, Clone)]
pub struct ScoredClaimRepository {
    pool: PgPool,
}

impl ScoredClaimRepository {
    /// Creates a new ScoredClaimRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Appends one scoring record
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` if the scoring id was already stored
    pub async fn insert(&self, row: &NewScoredClaim) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO scored_claims (
                scoring_id, claim_id, claimant_id, amount, report_delay_days,
                provider, notes, location, is_new_bank, submitted_at,
                fraud_probability, decision, alarms, features, explanation,
                score_source, degraded, scored_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(row.scoring_id)
        .bind(row.claim_id)
        .bind(&row.claimant_id)
        .bind(row.amount)
        .bind(row.report_delay_days)
        .bind(&row.provider)
        .bind(&row.notes)
        .bind(&row.location)
        .bind(row.is_new_bank)
        .bind(row.submitted_at)
        .bind(row.fraud_probability)
        .bind(&row.decision)
        .bind(Json(&row.alarms))
        .bind(Json(&row.features))
        .bind(&row.explanation)
        .bind(&row.score_source)
        .bind(row.degraded)
        .bind(row.scored_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(())
    }

    /// Retrieves a scored claim by its scoring identifier
    pub async fn get_by_scoring_id(&self, scoring_id: Uuid) -> Result<ScoredClaimRow, DatabaseError> {
        sqlx::query_as::<_, ScoredClaimRow>(
            r#"
            SELECT scoring_id, claim_id, claimant_id, amount, report_delay_days,
                   provider, notes, location, is_new_bank, submitted_at,
                   fraud_probability, decision, alarms, features, explanation,
                   score_source, degraded, scored_at
            FROM scored_claims
            WHERE scoring_id = $1
            "#,
        )
        .bind(scoring_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("ScoredClaim", scoring_id))
    }

    /// Counts claims submitted in `[since, until)`
    pub async fn count_in_window(
        &self,
        claimant_id: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM scored_claims
            WHERE claimant_id = $1 AND submitted_at >= $2 AND submitted_at < $3
            "#,
        )
        .bind(claimant_id)
        .bind(since)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Most recent non-empty notes in `[since, until)`, newest first
    pub async fn recent_notes(
        &self,
        claimant_id: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<String>, DatabaseError> {
        let notes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT notes
            FROM scored_claims
            WHERE claimant_id = $1 AND submitted_at >= $2 AND submitted_at < $3 AND notes <> ''
            ORDER BY submitted_at DESC
            LIMIT $4
            "#,
        )
        .bind(claimant_id)
        .bind(since)
        .bind(until)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }

    /// Average amount in `[since, until)`; `None` without prior claims
    pub async fn average_amount(
        &self,
        claimant_id: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Option<Decimal>, DatabaseError> {
        let average = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT AVG(amount)
            FROM scored_claims
            WHERE claimant_id = $1 AND submitted_at >= $2 AND submitted_at < $3
            "#,
        )
        .bind(claimant_id)
        .bind(since)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;

        Ok(average)
    }

    pub async fn last_submitted_before(
        &self,
        claimant_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        let last = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            r#"
            SELECT MAX(submitted_at)
            FROM scored_claims
            WHERE claimant_id = $1 AND submitted_at < $2
            "#,
        )
        .bind(claimant_id)
        .bind(before)
        .fetch_one(&self.pool)
        .await?;

        Ok(last)
    }

    pub async fn registered_address(&self, claimant_id: &str) -> Result<Option<String>, DatabaseError> {
        let address = sqlx::query_scalar::<_, String>(
            "SELECT registered_address FROM claimants WHERE claimant_id = $1",
        )
        .bind(claimant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address)
    }

    /// Inserts or replaces a claimant's registered address
    pub async fn upsert_address(&self, claimant_id: &str, address: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO claimants (claimant_id, registered_address, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (claimant_id)
            DO UPDATE SET registered_address = EXCLUDED.registered_address, updated_at = NOW()
            "#,
        )
        .bind(claimant_id)
        .bind(address)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// A stored scoring record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoredClaimRow {
    pub scoring_id: Uuid,
    pub claim_id: Uuid,
    pub claimant_id: String,
    pub amount: Decimal,
    pub report_delay_days: i32,
    pub provider: String,
    pub notes: String,
    pub location: String,
    pub is_new_bank: bool,
    pub submitted_at: DateTime<Utc>,
    pub fraud_probability: f64,
    pub decision: String,
    pub alarms: Json<JsonValue>,
    pub features: Json<JsonValue>,
    pub explanation: String,
    pub score_source: String,
    pub degraded: bool,
    pub scored_at: DateTime<Utc>,
}

/// Data for appending a scoring record
#[derive(Debug, Clone)]
pub struct NewScoredClaim {
    pub scoring_id: Uuid,
    pub claim_id: Uuid,
    pub claimant_id: String,
    pub amount: Decimal,
    pub report_delay_days: i32,
    pub provider: String,
    pub notes: String,
    pub location: String,
    pub is_new_bank: bool,
    pub submitted_at: DateTime<Utc>,
    pub fraud_probability: f64,
    pub decision: String,
    pub alarms: JsonValue,
    pub features: JsonValue,
    pub explanation: String,
    pub score_source: String,
    pub degraded: bool,
    pub scored_at: DateTime<Utc>,
}
