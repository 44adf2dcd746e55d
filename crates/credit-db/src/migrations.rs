//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite/` are compiled into the binary and
//! applied by [`Database::new`](crate::Database::new). sqlx records each one in
//! `_sqlx_migrations`, so reopening an existing file is a no-op.
//!
//! ```text
//! 001_credit_schema.sql   credit_terms · credit_ledger · feature_flags
//!                         customer_benefits · audit_facts
//! ```
//!
//! Applied files are never edited; schema changes go in a new `NNN_*.sql`.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(migrations = MIGRATOR.migrations.len(), "Credit schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;
    Ok((MIGRATOR.migrations.len(), applied as usize))
}
