//! # Engine Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StoreError   store trait failures   → CreditError::Storage             │
//! │               (Duplicate on a ledger row → InvalidTransition in service)│
//! │  AuditError   sink delivery failures → logged with warn!, never returned│
//! │  ConfigError  configuration loading  → returned from EngineConfig::load │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use credit_core::CreditError;
use credit_db::DbError;
use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Failures of the store traits.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record changed between read and write (optimistic check failed).
    #[error("{entity} {id} was modified concurrently")]
    Conflict { entity: String, id: String },

    /// A unique key already exists (terms for a customer, ledger row for an order).
    #[error("{entity} {id} already exists")]
    Duplicate { entity: String, id: String },

    /// A row the write depends on is missing.
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    /// Underlying database failure.
    #[error(transparent)]
    Db(DbError),
}

impl StoreError {
    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::Conflict {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::Duplicate {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Lifts the database's own conflict and uniqueness errors into store terms.
impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::VersionConflict { entity, id, .. } => StoreError::Conflict { entity, id },
            DbError::UniqueViolation { field, value } => StoreError::Duplicate {
                entity: field,
                id: value,
            },
            DbError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            other => StoreError::Db(other),
        }
    }
}

impl From<StoreError> for CreditError {
    fn from(err: StoreError) -> Self {
        CreditError::Storage(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Audit Error
// =============================================================================

/// Audit delivery failure. The mutation that produced the fact still stands.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Audit sink unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
