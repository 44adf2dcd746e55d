//! SQLite-backed stores over [`credit_db::Database`].
//!
//! Thin adapters: every method delegates to a repository and lifts
//! `DbError` into `StoreError` (version conflicts and unique violations keep
//! their meaning).

use async_trait::async_trait;

use credit_core::{
    BenefitType, CreditStatus, CreditTerms, CustomerBenefit, FeatureFlag, FeatureKey, LedgerEntry,
};
use credit_db::Database;

use super::{BenefitStore, CreditStore, FlagStore};
use crate::error::StoreResult;

/// Every store trait, persisted in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl CreditStore for SqliteStore {
    async fn get_terms(&self, customer_id: &str) -> StoreResult<Option<CreditTerms>> {
        Ok(self.db.terms().get(customer_id).await?)
    }

    async fn terms_with_status(&self, status: CreditStatus) -> StoreResult<Vec<CreditTerms>> {
        Ok(self.db.terms().list_by_status(status).await?)
    }

    async fn insert_terms(&self, terms: &CreditTerms) -> StoreResult<()> {
        Ok(self.db.terms().insert(terms).await?)
    }

    async fn update_terms(&self, terms: &CreditTerms, expected_version: i64) -> StoreResult<()> {
        Ok(self.db.terms().update(terms, expected_version).await?)
    }

    async fn record_usage(
        &self,
        terms: &CreditTerms,
        expected_version: i64,
        entry: &LedgerEntry,
    ) -> StoreResult<()> {
        Ok(self
            .db
            .terms()
            .apply_usage(terms, expected_version, entry)
            .await?)
    }

    async fn record_settlement(
        &self,
        terms: &CreditTerms,
        expected_version: i64,
        entry: &LedgerEntry,
    ) -> StoreResult<()> {
        Ok(self
            .db
            .terms()
            .apply_settlement(terms, expected_version, entry)
            .await?)
    }

    async fn ledger_entry(&self, order_id: &str) -> StoreResult<Option<LedgerEntry>> {
        Ok(self.db.ledger().get_by_order(order_id).await?)
    }

    async fn ledger_for_customer(&self, customer_id: &str) -> StoreResult<Vec<LedgerEntry>> {
        Ok(self.db.ledger().list_for_customer(customer_id).await?)
    }
}

#[async_trait]
impl FlagStore for SqliteStore {
    async fn get_flag(&self, key: FeatureKey) -> StoreResult<Option<FeatureFlag>> {
        Ok(self.db.flags().get(key).await?)
    }

    async fn put_flag(&self, flag: &FeatureFlag) -> StoreResult<()> {
        Ok(self.db.flags().upsert(flag).await?)
    }

    async fn list_flags(&self) -> StoreResult<Vec<FeatureFlag>> {
        Ok(self.db.flags().list().await?)
    }
}

#[async_trait]
impl BenefitStore for SqliteStore {
    async fn get_benefit(
        &self,
        customer_id: &str,
        benefit_type: BenefitType,
    ) -> StoreResult<Option<CustomerBenefit>> {
        Ok(self.db.benefits().get(customer_id, benefit_type).await?)
    }

    async fn benefits_for_customer(&self, customer_id: &str) -> StoreResult<Vec<CustomerBenefit>> {
        Ok(self.db.benefits().list_for_customer(customer_id).await?)
    }

    async fn put_benefit(&self, benefit: &CustomerBenefit) -> StoreResult<()> {
        Ok(self.db.benefits().upsert(benefit).await?)
    }
}
