//! # Audit Fact Repository
//!
//! Append-only store for audit facts. Payloads are kept as JSON text.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use credit_core::{AuditEventType, AuditFact, Severity};

/// Repository for audit facts.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    /// Creates a new AuditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Appends one fact.
    pub async fn insert(&self, fact: &AuditFact) -> DbResult<()> {
        debug!(id = %fact.id, event = fact.event_type.as_str(), "Inserting audit fact");

        sqlx::query(
            r#"
            INSERT INTO audit_facts (id, actor_id, event_type, event_data, severity, occurred_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&fact.id)
        .bind(&fact.actor_id)
        .bind(fact.event_type)
        .bind(fact.event_data.to_string())
        .bind(fact.severity)
        .bind(fact.occurred_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Most recent facts first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<AuditFact>> {
        let rows = sqlx::query(
            r#"
            SELECT id, actor_id, event_type, event_data, severity, occurred_at
            FROM audit_facts
            ORDER BY occurred_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(fact_from_row).collect()
    }

    /// Number of stored facts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_facts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn fact_from_row(row: &SqliteRow) -> DbResult<AuditFact> {
    let raw: String = row.try_get("event_data")?;
    let event_data = serde_json::from_str(&raw).map_err(|e| DbError::Decode {
        column: "event_data".to_string(),
        reason: e.to_string(),
    })?;

    Ok(AuditFact {
        id: row.try_get("id")?,
        actor_id: row.try_get("actor_id")?,
        event_type: row.try_get::<AuditEventType, _>("event_type")?,
        event_data,
        severity: row.try_get::<Severity, _>("severity")?,
        occurred_at: row.try_get("occurred_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.audit();

        let fact = AuditFact::new(
            "admin",
            AuditEventType::CreditSuspended,
            Severity::High,
            json!({ "customer_id": "CUST-1", "reason": "dispute" }),
        );
        repo.insert(&fact).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        let facts = repo.recent(10).await.unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].event_type, AuditEventType::CreditSuspended);
        assert_eq!(facts[0].severity, Severity::High);
        assert_eq!(facts[0].event_data["reason"], "dispute");
    }
}
