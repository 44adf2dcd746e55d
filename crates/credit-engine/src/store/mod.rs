//! # Store Traits
//!
//! Persistence seams used by the engine. Two implementations ship:
//!
//! - [`InMemoryStore`]: all three traits over tokio `RwLock`ed maps (tests, embedding)
//! - [`SqliteStore`]: all three traits over `credit_db::Database`
//!
//! ## Write Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update_terms / record_usage / record_settlement take the NEXT snapshot │
//! │  plus the version the caller read. The write happens only if the       │
//! │  stored version still matches:                                          │
//! │                                                                         │
//! │    stored.version == expected_version  → write, Ok(())                  │
//! │    otherwise                           → Err(StoreError::Conflict)      │
//! │                                                                         │
//! │  record_usage writes terms AND the new ledger row, or neither.          │
//! │  record_settlement writes terms AND the updated ledger row, or neither. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use credit_core::{
    BenefitType, CreditStatus, CreditTerms, CustomerBenefit, FeatureFlag, FeatureKey, LedgerEntry,
};

use crate::error::StoreResult;

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Credit terms and the ledger rows that move their balance.
#[async_trait]
pub trait CreditStore: Send + Sync {
    async fn get_terms(&self, customer_id: &str) -> StoreResult<Option<CreditTerms>>;

    /// Every account in `status`, ordered by customer id.
    async fn terms_with_status(&self, status: CreditStatus) -> StoreResult<Vec<CreditTerms>>;

    /// Inserts first-time terms. `Duplicate` if the customer already has terms.
    async fn insert_terms(&self, terms: &CreditTerms) -> StoreResult<()>;

    /// Version-checked replace of existing terms.
    async fn update_terms(&self, terms: &CreditTerms, expected_version: i64) -> StoreResult<()>;

    /// Version-checked balance increase plus the new ledger row, atomically.
    ///
    /// `Duplicate` if the order already has a ledger row.
    async fn record_usage(
        &self,
        terms: &CreditTerms,
        expected_version: i64,
        entry: &LedgerEntry,
    ) -> StoreResult<()>;

    /// Version-checked balance decrease plus the updated ledger row, atomically.
    async fn record_settlement(
        &self,
        terms: &CreditTerms,
        expected_version: i64,
        entry: &LedgerEntry,
    ) -> StoreResult<()>;

    async fn ledger_entry(&self, order_id: &str) -> StoreResult<Option<LedgerEntry>>;

    /// A customer's entries in the order they were recorded.
    async fn ledger_for_customer(&self, customer_id: &str) -> StoreResult<Vec<LedgerEntry>>;
}

/// Kill-switch records.
#[async_trait]
pub trait FlagStore: Send + Sync {
    async fn get_flag(&self, key: FeatureKey) -> StoreResult<Option<FeatureFlag>>;

    /// Inserts or replaces the record for `flag.feature_key`.
    async fn put_flag(&self, flag: &FeatureFlag) -> StoreResult<()>;

    /// Every stored record. Keys without a record are not listed.
    async fn list_flags(&self) -> StoreResult<Vec<FeatureFlag>>;
}

/// Customer benefit rows.
#[async_trait]
pub trait BenefitStore: Send + Sync {
    async fn get_benefit(
        &self,
        customer_id: &str,
        benefit_type: BenefitType,
    ) -> StoreResult<Option<CustomerBenefit>>;

    async fn benefits_for_customer(&self, customer_id: &str) -> StoreResult<Vec<CustomerBenefit>>;

    /// Inserts or replaces the row for `(customer_id, benefit_type)`.
    async fn put_benefit(&self, benefit: &CustomerBenefit) -> StoreResult<()>;
}
