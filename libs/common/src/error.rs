//! Custom error types for the common library
//!
//! This module defines the storage-level error types shared by the services
//! of the studio albums backend.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Sequence allocation failed
    #[error("Sequence error: {0}")]
    Sequence(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify a query error, separating unique violations from other failures
    pub fn from_query(err: SqlxError) -> Self {
        if let SqlxError::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return DatabaseError::UniqueViolation(constraint);
            }
        }
        DatabaseError::Query(err)
    }
}

impl From<redis::RedisError> for DatabaseError {
    fn from(err: redis::RedisError) -> Self {
        DatabaseError::Sequence(err.to_string())
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_stay_query_errors() {
        let err = DatabaseError::from_query(SqlxError::RowNotFound);
        assert!(matches!(err, DatabaseError::Query(SqlxError::RowNotFound)));
    }

    #[test]
    fn test_error_messages() {
        let err = DatabaseError::UniqueViolation("idx_album_shares_user_album".to_string());
        assert_eq!(
            err.to_string(),
            "Unique constraint violated: idx_album_shares_user_album"
        );
    }
}
