//! # Customer Benefit Repository
//!
//! One row per customer × benefit type. Rows are upserted on every toggle
//! and never deleted.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use credit_core::{BenefitType, CustomerBenefit};

/// Repository for customer benefits.
#[derive(Debug, Clone)]
pub struct BenefitRepository {
    pool: SqlitePool,
}

impl BenefitRepository {
    /// Creates a new BenefitRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BenefitRepository { pool }
    }

    /// Gets one benefit row.
    pub async fn get(
        &self,
        customer_id: &str,
        benefit_type: BenefitType,
    ) -> DbResult<Option<CustomerBenefit>> {
        let row = sqlx::query_as::<_, CustomerBenefit>(
            r#"
            SELECT customer_id, benefit_type, enabled, enabled_at, disabled_at,
                   disabled_reason, updated_by
            FROM customer_benefits
            WHERE customer_id = ?1 AND benefit_type = ?2
            "#,
        )
        .bind(customer_id)
        .bind(benefit_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists every benefit row of a customer.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<CustomerBenefit>> {
        let rows = sqlx::query_as::<_, CustomerBenefit>(
            r#"
            SELECT customer_id, benefit_type, enabled, enabled_at, disabled_at,
                   disabled_reason, updated_by
            FROM customer_benefits
            WHERE customer_id = ?1
            ORDER BY benefit_type
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts or replaces a benefit row.
    pub async fn upsert(&self, benefit: &CustomerBenefit) -> DbResult<()> {
        debug!(
            customer_id = %benefit.customer_id,
            benefit = %benefit.benefit_type,
            enabled = benefit.enabled,
            "Upserting customer benefit"
        );

        sqlx::query(
            r#"
            INSERT INTO customer_benefits (
                customer_id, benefit_type, enabled, enabled_at, disabled_at,
                disabled_reason, updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(customer_id, benefit_type) DO UPDATE SET
                enabled = excluded.enabled,
                enabled_at = excluded.enabled_at,
                disabled_at = excluded.disabled_at,
                disabled_reason = excluded.disabled_reason,
                updated_by = excluded.updated_by
            "#,
        )
        .bind(&benefit.customer_id)
        .bind(benefit.benefit_type)
        .bind(benefit.enabled)
        .bind(benefit.enabled_at)
        .bind(benefit.disabled_at)
        .bind(&benefit.disabled_reason)
        .bind(&benefit.updated_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
