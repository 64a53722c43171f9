//! Audit store errors

use thiserror::Error;

use core_kernel::PortError;

/// PostgreSQL error codes the store distinguishes
/// (https://www.postgresql.org/docs/current/errcodes-appendix.html)
const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A scoring id was appended twice
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Alarms or features could not be encoded as JSON
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DatabaseError {
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("ScoredClaim", "SCR-123");
    /// assert!(error.to_string().contains("SCR-123"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{entity} '{id}'"))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }

    /// Connection problems a retry may clear
    pub fn is_transient(&self) -> bool {
        matches!(self, DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted)
    }
}

impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("row".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.code().as_deref() {
                    Some(UNIQUE_VIOLATION) => DatabaseError::DuplicateEntry(message),
                    Some(CHECK_VIOLATION) => DatabaseError::ConstraintViolation(message),
                    _ => DatabaseError::QueryFailed(message),
                }
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DatabaseError::SerializationError(error.to_string())
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::from(&error)
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(error: serde_json::Error) -> Self {
        DatabaseError::SerializationError(error.to_string())
    }
}

/// How store failures reach the fraud engine
impl From<DatabaseError> for PortError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => PortError::not_found("ScoredClaim", msg),
            DatabaseError::ConnectionFailed(msg) => PortError::connection(msg),
            DatabaseError::PoolExhausted => PortError::unavailable("postgres connection pool"),
            DatabaseError::DuplicateEntry(msg) | DatabaseError::ConstraintViolation(msg) => {
                PortError::validation(msg)
            }
            DatabaseError::SerializationError(msg) => PortError::transformation(msg),
            other => PortError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlx_classification() {
        assert!(DatabaseError::from(&sqlx::Error::RowNotFound).is_not_found());
        assert!(DatabaseError::from(sqlx::Error::PoolTimedOut).is_transient());
        assert!(DatabaseError::from(sqlx::Error::PoolClosed).is_transient());
        assert!(!DatabaseError::from(sqlx::Error::Protocol("bad frame".into())).is_transient());
    }

    #[test]
    fn test_port_error_translation() {
        assert!(PortError::from(DatabaseError::not_found("ScoredClaim", "x")).is_not_found());
        assert!(PortError::from(DatabaseError::PoolExhausted).is_transient());
        assert!(PortError::from(DatabaseError::ConnectionFailed("refused".into())).is_transient());
        assert!(!PortError::from(DatabaseError::QueryFailed("syntax".into())).is_transient());
        assert!(!PortError::from(DatabaseError::DuplicateEntry("scoring_id".into())).is_transient());
    }
}
