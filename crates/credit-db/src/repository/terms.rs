//! # Credit Terms Repository
//!
//! Database operations for credit terms, including the two balance-moving
//! transactions that also touch the ledger.
//!
//! ## Optimistic Version Check
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  read terms (version = 7)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rules produce next snapshot (version = 8)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE credit_terms SET ..., version = 8                               │
//! │   WHERE customer_id = ? AND version = 7                                 │
//! │       │                                                                 │
//! │       ├── 1 row  → commit                                               │
//! │       └── 0 rows → someone else wrote first → VersionConflict           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Usage and settlement run the version-checked UPDATE and the ledger write
//! in one transaction, so the balance and the ledger never disagree.

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use credit_core::{CreditStatus, CreditTerms, LedgerEntry};

const SELECT_TERMS: &str = r#"
    SELECT
        customer_id,
        credit_limit_cents,
        current_balance_cents,
        status,
        net_terms,
        suspended_reason,
        suspended_at,
        approved_by,
        created_at,
        updated_at,
        version
    FROM credit_terms
"#;

/// Repository for credit terms.
#[derive(Debug, Clone)]
pub struct CreditTermsRepository {
    pool: SqlitePool,
}

impl CreditTermsRepository {
    /// Creates a new CreditTermsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CreditTermsRepository { pool }
    }

    /// Gets the terms for a customer.
    pub async fn get(&self, customer_id: &str) -> DbResult<Option<CreditTerms>> {
        let sql = format!("{SELECT_TERMS} WHERE customer_id = ?1");
        let terms = sqlx::query_as::<_, CreditTerms>(&sql)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(terms)
    }

    /// Lists every customer's terms with a given status.
    pub async fn list_by_status(&self, status: CreditStatus) -> DbResult<Vec<CreditTerms>> {
        let sql = format!("{SELECT_TERMS} WHERE status = ?1 ORDER BY customer_id");
        let rows = sqlx::query_as::<_, CreditTerms>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Inserts first-time terms.
    ///
    /// ## Errors
    /// `UniqueViolation` if the customer already has terms.
    pub async fn insert(&self, terms: &CreditTerms) -> DbResult<()> {
        debug!(customer_id = %terms.customer_id, limit_cents = terms.credit_limit_cents, "Inserting credit terms");

        sqlx::query(
            r#"
            INSERT INTO credit_terms (
                customer_id, credit_limit_cents, current_balance_cents,
                status, net_terms, suspended_reason, suspended_at,
                approved_by, created_at, updated_at, version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&terms.customer_id)
        .bind(terms.credit_limit_cents)
        .bind(terms.current_balance_cents)
        .bind(terms.status)
        .bind(terms.net_terms)
        .bind(&terms.suspended_reason)
        .bind(terms.suspended_at)
        .bind(&terms.approved_by)
        .bind(terms.created_at)
        .bind(terms.updated_at)
        .bind(terms.version)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: terms.customer_id.clone(),
            },
            other => other,
        })?;

        Ok(())
    }

    /// Writes `terms` if the stored row still has `expected_version`.
    pub async fn update(&self, terms: &CreditTerms, expected_version: i64) -> DbResult<()> {
        debug!(
            customer_id = %terms.customer_id,
            status = %terms.status,
            expected_version,
            "Updating credit terms"
        );

        let mut tx = self.pool.begin().await?;
        update_in_tx(&mut tx, terms, expected_version).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Records a use of credit: new balance plus the ledger row, atomically.
    ///
    /// ## Errors
    /// - `VersionConflict` if the terms changed since they were read
    /// - `UniqueViolation` if the order already has a ledger row
    pub async fn apply_usage(
        &self,
        terms: &CreditTerms,
        expected_version: i64,
        entry: &LedgerEntry,
    ) -> DbResult<()> {
        debug!(
            customer_id = %terms.customer_id,
            order_id = %entry.order_id,
            amount_cents = entry.credit_amount_used_cents,
            "Applying credit usage"
        );

        let mut tx = self.pool.begin().await?;

        update_in_tx(&mut tx, terms, expected_version).await?;

        sqlx::query(
            r#"
            INSERT INTO credit_ledger (
                id, order_id, customer_id, credit_amount_used_cents,
                amount_paid_cents, payment_status, used_at, credit_due_date, settled_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.order_id)
        .bind(&entry.customer_id)
        .bind(entry.credit_amount_used_cents)
        .bind(entry.amount_paid_cents)
        .bind(entry.payment_status)
        .bind(entry.used_at)
        .bind(entry.credit_due_date)
        .bind(entry.settled_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: entry.order_id.clone(),
            },
            other => other,
        })?;

        tx.commit().await?;
        Ok(())
    }

    /// Records a settlement: new balance plus the updated ledger row, atomically.
    pub async fn apply_settlement(
        &self,
        terms: &CreditTerms,
        expected_version: i64,
        entry: &LedgerEntry,
    ) -> DbResult<()> {
        debug!(
            customer_id = %terms.customer_id,
            order_id = %entry.order_id,
            paid_cents = entry.amount_paid_cents,
            status = %entry.payment_status,
            "Applying settlement"
        );

        let mut tx = self.pool.begin().await?;

        update_in_tx(&mut tx, terms, expected_version).await?;

        let result = sqlx::query(
            r#"
            UPDATE credit_ledger
            SET amount_paid_cents = ?1,
                payment_status = ?2,
                settled_at = ?3
            WHERE order_id = ?4
            "#,
        )
        .bind(entry.amount_paid_cents)
        .bind(entry.payment_status)
        .bind(entry.settled_at)
        .bind(&entry.order_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("LedgerEntry", &entry.order_id));
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Version-checked UPDATE shared by every terms write.
async fn update_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    terms: &CreditTerms,
    expected_version: i64,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE credit_terms
        SET credit_limit_cents = ?1,
            current_balance_cents = ?2,
            status = ?3,
            net_terms = ?4,
            suspended_reason = ?5,
            suspended_at = ?6,
            approved_by = ?7,
            updated_at = ?8,
            version = ?9
        WHERE customer_id = ?10 AND version = ?11
        "#,
    )
    .bind(terms.credit_limit_cents)
    .bind(terms.current_balance_cents)
    .bind(terms.status)
    .bind(terms.net_terms)
    .bind(&terms.suspended_reason)
    .bind(terms.suspended_at)
    .bind(&terms.approved_by)
    .bind(terms.updated_at)
    .bind(terms.version)
    .bind(&terms.customer_id)
    .bind(expected_version)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::version_conflict(
            "CreditTerms",
            &terms.customer_id,
            expected_version,
        ));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
