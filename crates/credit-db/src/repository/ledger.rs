//! # Ledger Repository
//!
//! Read access to credit ledger rows. Rows are written only through
//! [`CreditTermsRepository::apply_usage`](super::terms::CreditTermsRepository::apply_usage)
//! and `apply_settlement`, together with the balance they move.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use credit_core::LedgerEntry;

const SELECT_ENTRY: &str = r#"
    SELECT
        id,
        order_id,
        customer_id,
        credit_amount_used_cents,
        amount_paid_cents,
        payment_status,
        used_at,
        credit_due_date,
        settled_at
    FROM credit_ledger
"#;

/// Repository for ledger reads.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Gets the ledger row for an order.
    pub async fn get_by_order(&self, order_id: &str) -> DbResult<Option<LedgerEntry>> {
        let sql = format!("{SELECT_ENTRY} WHERE order_id = ?1");
        let entry = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    /// Lists a customer's entries in the order they were recorded.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<LedgerEntry>> {
        debug!(customer_id = %customer_id, "Listing ledger entries");

        let sql = format!("{SELECT_ENTRY} WHERE customer_id = ?1 ORDER BY rowid");
        let entries = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use chrono::Utc;
    use credit_core::{CreditTerms, LedgerEntry, Money, NetTerms};

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let mut terms = CreditTerms::approved("CUST-1", Money::from_major(1000), NetTerms::Net7, "admin", now);
        db.terms().insert(&terms).await.unwrap();

        for order in ["ORD-C", "ORD-A", "ORD-B"] {
            let next = terms.charged(Money::from_major(10), now).unwrap();
            let entry = LedgerEntry::open(order, "CUST-1", Money::from_major(10), NetTerms::Net7, now);
            db.terms().apply_usage(&next, terms.version, &entry).await.unwrap();
            terms = next;
        }

        let entries = db.ledger().list_for_customer("CUST-1").await.unwrap();
        let orders: Vec<&str> = entries.iter().map(|e| e.order_id.as_str()).collect();
        assert_eq!(orders, vec!["ORD-C", "ORD-A", "ORD-B"]);
        assert_eq!(entries[0].credit_due_date, entries[0].used_at + chrono::Duration::days(7));

        assert!(db.ledger().list_for_customer("CUST-2").await.unwrap().is_empty());
        assert!(db.ledger().get_by_order("ORD-Z").await.unwrap().is_none());
    }
}
