//! In-memory store for tests and embedded use.
//!
//! All state sits behind one `RwLock`, so `record_usage` and
//! `record_settlement` see and change terms and ledger together.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use credit_core::{
    BenefitType, CreditStatus, CreditTerms, CustomerBenefit, FeatureFlag, FeatureKey, LedgerEntry,
};

use super::{BenefitStore, CreditStore, FlagStore};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    terms: HashMap<String, CreditTerms>,
    /// Insertion order is the recording order.
    ledger: Vec<LedgerEntry>,
    flags: HashMap<FeatureKey, FeatureFlag>,
    benefits: HashMap<(String, BenefitType), CustomerBenefit>,
}

impl State {
    fn check_version(&self, customer_id: &str, expected_version: i64) -> StoreResult<()> {
        match self.terms.get(customer_id) {
            Some(stored) if stored.version == expected_version => Ok(()),
            Some(_) => Err(StoreError::conflict("CreditTerms", customer_id)),
            None => Err(StoreError::not_found("CreditTerms", customer_id)),
        }
    }
}

/// In-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CreditStore for InMemoryStore {
    async fn get_terms(&self, customer_id: &str) -> StoreResult<Option<CreditTerms>> {
        Ok(self.state.read().await.terms.get(customer_id).cloned())
    }

    async fn terms_with_status(&self, status: CreditStatus) -> StoreResult<Vec<CreditTerms>> {
        let state = self.state.read().await;
        let mut matching: Vec<CreditTerms> = state
            .terms
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.customer_id.cmp(&b.customer_id));
        Ok(matching)
    }

    async fn insert_terms(&self, terms: &CreditTerms) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if state.terms.contains_key(&terms.customer_id) {
            return Err(StoreError::duplicate("CreditTerms", &terms.customer_id));
        }
        state.terms.insert(terms.customer_id.clone(), terms.clone());
        Ok(())
    }

    async fn update_terms(&self, terms: &CreditTerms, expected_version: i64) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.check_version(&terms.customer_id, expected_version)?;
        state.terms.insert(terms.customer_id.clone(), terms.clone());
        Ok(())
    }

    async fn record_usage(
        &self,
        terms: &CreditTerms,
        expected_version: i64,
        entry: &LedgerEntry,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.check_version(&terms.customer_id, expected_version)?;
        if state.ledger.iter().any(|e| e.order_id == entry.order_id) {
            return Err(StoreError::duplicate("LedgerEntry", &entry.order_id));
        }
        state.terms.insert(terms.customer_id.clone(), terms.clone());
        state.ledger.push(entry.clone());
        Ok(())
    }

    async fn record_settlement(
        &self,
        terms: &CreditTerms,
        expected_version: i64,
        entry: &LedgerEntry,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.check_version(&terms.customer_id, expected_version)?;
        let position = state
            .ledger
            .iter()
            .position(|e| e.order_id == entry.order_id)
            .ok_or_else(|| StoreError::not_found("LedgerEntry", &entry.order_id))?;
        state.terms.insert(terms.customer_id.clone(), terms.clone());
        state.ledger[position] = entry.clone();
        Ok(())
    }

    async fn ledger_entry(&self, order_id: &str) -> StoreResult<Option<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state.ledger.iter().find(|e| e.order_id == order_id).cloned())
    }

    async fn ledger_for_customer(&self, customer_id: &str) -> StoreResult<Vec<LedgerEntry>> {
        let state = self.state.read().await;
        Ok(state
            .ledger
            .iter()
            .filter(|e| e.customer_id == customer_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FlagStore for InMemoryStore {
    async fn get_flag(&self, key: FeatureKey) -> StoreResult<Option<FeatureFlag>> {
        Ok(self.state.read().await.flags.get(&key).cloned())
    }

    async fn put_flag(&self, flag: &FeatureFlag) -> StoreResult<()> {
        self.state
            .write()
            .await
            .flags
            .insert(flag.feature_key, flag.clone());
        Ok(())
    }

    async fn list_flags(&self) -> StoreResult<Vec<FeatureFlag>> {
        let state = self.state.read().await;
        let mut flags: Vec<FeatureFlag> = state.flags.values().cloned().collect();
        flags.sort_by_key(|f| f.feature_key);
        Ok(flags)
    }
}

#[async_trait]
impl BenefitStore for InMemoryStore {
    async fn get_benefit(
        &self,
        customer_id: &str,
        benefit_type: BenefitType,
    ) -> StoreResult<Option<CustomerBenefit>> {
        let key = (customer_id.to_string(), benefit_type);
        Ok(self.state.read().await.benefits.get(&key).cloned())
    }

    async fn benefits_for_customer(&self, customer_id: &str) -> StoreResult<Vec<CustomerBenefit>> {
        let state = self.state.read().await;
        let mut rows: Vec<CustomerBenefit> = state
            .benefits
            .values()
            .filter(|b| b.customer_id == customer_id)
            .cloned()
            .collect();
        rows.sort_by_key(|b| b.benefit_type);
        Ok(rows)
    }

    async fn put_benefit(&self, benefit: &CustomerBenefit) -> StoreResult<()> {
        let key = (benefit.customer_id.clone(), benefit.benefit_type);
        self.state.write().await.benefits.insert(key, benefit.clone());
        Ok(())
    }
}
