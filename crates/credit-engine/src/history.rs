//! Customer order history, supplied by the CRM that owns orders and invoices.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use credit_core::{CreditResult, CustomerHistory};

/// Source of the facts eligibility is evaluated on.
#[async_trait]
pub trait CustomerHistoryProvider: Send + Sync {
    /// History for `customer_id`. Unknown customers get an empty history
    /// (no orders, bronze, nothing overdue), which is never eligible.
    async fn history(&self, customer_id: &str) -> CreditResult<CustomerHistory>;
}

/// Fixed histories held in memory.
#[derive(Debug, Default)]
pub struct InMemoryHistoryProvider {
    histories: RwLock<HashMap<String, CustomerHistory>>,
}

impl InMemoryHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, customer_id: impl Into<String>, history: CustomerHistory) {
        self.histories
            .write()
            .await
            .insert(customer_id.into(), history);
    }
}

#[async_trait]
impl CustomerHistoryProvider for InMemoryHistoryProvider {
    async fn history(&self, customer_id: &str) -> CreditResult<CustomerHistory> {
        Ok(self
            .histories
            .read()
            .await
            .get(customer_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_core::LoyaltyTier;

    #[tokio::test]
    async fn test_unknown_customer_gets_empty_history() {
        let provider = InMemoryHistoryProvider::new();
        provider
            .set(
                "CUST-1",
                CustomerHistory {
                    lifetime_orders: 5,
                    loyalty_tier: LoyaltyTier::Gold,
                    has_overdue_invoices: false,
                },
            )
            .await;

        assert_eq!(provider.history("CUST-1").await.unwrap().lifetime_orders, 5);
        assert_eq!(provider.history("CUST-2").await.unwrap(), CustomerHistory::default());
    }
}
