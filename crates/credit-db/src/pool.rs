//! # Connection Pool
//!
//! Opens the SQLite pool the repositories share and applies the schema.
//!
//! ```text
//! EngineConfig.database ──► DbConfig ──► Database::new()
//!                                            │
//!                         ┌──────────────────┼──────────────────┐
//!                         ▼                  ▼                  ▼
//!                  connect options      SqlitePool        migrations
//!                  (WAL, busy wait,   (max_connections)   (embedded)
//!                   foreign keys)            │
//!                                            ▼
//!              terms() · ledger() · flags() · benefits() · audit()
//! ```
//!
//! File databases run in WAL mode so summary and ledger reads do not wait on
//! the writer. `:memory:` databases are private to their single connection.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::audit::AuditRepository;
use crate::repository::benefits::BenefitRepository;
use crate::repository::flags::FeatureFlagRepository;
use crate::repository::ledger::LedgerRepository;
use crate::repository::terms::CreditTermsRepository;

const IN_MEMORY_PATH: &str = ":memory:";

/// Where the credit database lives and how many writers may queue on it.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/credit/credit.db").max_connections(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,
    /// Default 5; always 1 for `:memory:`.
    pub max_connections: u32,
    /// How long a connection waits for the SQLite write lock before
    /// reporting `database is locked`.
    pub busy_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(30),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    /// An isolated database for tests and throwaway runs.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            ..DbConfig::new(IN_MEMORY_PATH)
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
        } else {
            SqliteConnectOptions::from_str(&format!(
                "sqlite://{}?mode=rwc",
                self.database_path.display()
            ))
            .map(|o| {
                o.journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
                    .create_if_missing(true)
            })
        }
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        Ok(options.foreign_keys(true).busy_timeout(self.busy_timeout))
    }
}

/// Shared handle to the credit database. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects and brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let in_memory = config.is_in_memory();
        info!(
            path = %config.database_path.display(),
            in_memory,
            "Opening credit database"
        );

        let options = config.connect_options()?;

        // A `:memory:` database is dropped with its last connection, so it
        // must never be reaped by the pool.
        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { config.max_connections })
            .min_connections(1)
            .acquire_timeout(config.acquire_timeout);
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Pool ready");

        migrations::run_migrations(&pool).await?;
        Ok(Database { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn terms(&self) -> CreditTermsRepository {
        CreditTermsRepository::new(self.pool.clone())
    }

    pub fn ledger(&self) -> LedgerRepository {
        LedgerRepository::new(self.pool.clone())
    }

    pub fn flags(&self) -> FeatureFlagRepository {
        FeatureFlagRepository::new(self.pool.clone())
    }

    pub fn benefits(&self) -> BenefitRepository {
        BenefitRepository::new(self.pool.clone())
    }

    pub fn audit(&self) -> AuditRepository {
        AuditRepository::new(self.pool.clone())
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert!(total >= 1);
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credit.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert!(db.health_check().await);
        drop(db);

        let reopened = Database::new(DbConfig::new(&path).max_connections(2))
            .await
            .unwrap();
        let (total, applied) = migrations::migration_status(reopened.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[test]
    fn test_config() {
        let config = DbConfig::new("/tmp/credit.db").max_connections(0);
        assert_eq!(config.max_connections, 1);
        assert!(!config.is_in_memory());

        let memory = DbConfig::in_memory();
        assert!(memory.is_in_memory());
        assert_eq!(memory.max_connections, 1);
    }
}
