//! PostgreSQL pool and schema migrations

use std::time::Duration;

use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::error::DatabaseError;

pub type DatabasePool = PgPool;

/// Pool sizing for the audit store
///
/// Scoring writes are fire-and-forget and history reads sit on the scoring
/// path, so the acquire timeout is kept well under the history timeout.
///
/// ```rust
/// use infra_db::PoolSettings;
///
/// let settings: PoolSettings = serde_json::from_str(r#"{"max_connections": 32}"#).unwrap();
/// assert_eq!(settings.max_connections, 32);
/// assert_eq!(settings.min_connections, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_ms: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 16,
            min_connections: 2,
            acquire_timeout_ms: 1_500,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1_800,
        }
    }
}

impl PoolSettings {
    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections.max(1))
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(Duration::from_millis(self.acquire_timeout_ms))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(self.max_lifetime_secs))
    }
}

/// Opens a pool against `url`
///
/// # Errors
///
/// Returns `DatabaseError::ConnectionFailed` if no connection can be made
pub async fn connect(url: &str, settings: &PoolSettings) -> Result<DatabasePool, DatabaseError> {
    let pool = settings
        .options()
        .connect(url)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!(
        max_connections = settings.max_connections,
        min_connections = settings.min_connections,
        "Audit database pool ready"
    );
    Ok(pool)
}

/// Applies the embedded migrations under `migrations/`
///
/// # Errors
///
/// Returns `DatabaseError::MigrationFailed` if a migration cannot be applied
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Audit store migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_connections_capped_by_max() {
        let settings = PoolSettings {
            max_connections: 1,
            min_connections: 4,
            ..Default::default()
        };
        let options = settings.options();
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 1);
    }

    #[test]
    fn test_zero_max_connections_becomes_one() {
        let settings = PoolSettings {
            max_connections: 0,
            min_connections: 0,
            ..Default::default()
        };
        assert_eq!(settings.options().get_max_connections(), 1);
    }

    #[test]
    fn test_acquire_timeout_from_millis() {
        let options = PoolSettings::default().options();
        assert_eq!(options.get_acquire_timeout(), Duration::from_millis(1_500));
    }
}
