//! # Database Errors
//!
//! ```text
//! sqlx::Error ──► DbError ──► StoreError (credit-engine) ──► CreditError::Storage
//!                    │
//!                    ├─ UniqueViolation  second ledger row for an order,
//!                    │                   terms inserted twice
//!                    └─ VersionConflict  row changed since it was read
//! ```

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Another writer, typically another process on the same file, bumped
    /// the row's version between our read and our write.
    #[error("{entity} {id} was modified concurrently (expected version {expected})")]
    VersionConflict {
        entity: String,
        id: String,
        expected: i64,
    },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored JSON or enum text that no longer parses.
    #[error("Corrupt {column} value: {reason}")]
    Decode { column: String, reason: String },

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn version_conflict(entity: impl Into<String>, id: impl Into<String>, expected: i64) -> Self {
        DbError::VersionConflict {
            entity: entity.into(),
            id: id.into(),
            expected,
        }
    }
}

/// SQLite reports unique failures as `UNIQUE constraint failed: table.column`.
fn unique_column(message: &str) -> Option<&str> {
    message
        .strip_prefix("UNIQUE constraint failed: ")
        .map(|rest| rest.split(',').next().unwrap_or(rest).trim())
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => match unique_column(db_err.message()) {
                // The offending value is filled in by the repository that knows it.
                Some(column) => DbError::duplicate(column, "unknown"),
                None => DbError::QueryFailed(db_err.message().to_string()),
            },
            sqlx::Error::ColumnDecode { index, source } => DbError::Decode {
                column: index,
                reason: source.to_string(),
            },
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_column_parsing() {
        assert_eq!(
            unique_column("UNIQUE constraint failed: credit_ledger.order_id"),
            Some("credit_ledger.order_id")
        );
        assert_eq!(
            unique_column("UNIQUE constraint failed: customer_benefits.customer_id, customer_benefits.benefit_type"),
            Some("customer_benefits.customer_id")
        );
        assert_eq!(unique_column("FOREIGN KEY constraint failed"), None);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DbError::version_conflict("CreditTerms", "CUST-1", 4).to_string(),
            "CreditTerms CUST-1 was modified concurrently (expected version 4)"
        );
        assert_eq!(
            DbError::duplicate("credit_ledger.order_id", "ORD-9").to_string(),
            "Duplicate credit_ledger.order_id: 'ORD-9' already exists"
        );
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
