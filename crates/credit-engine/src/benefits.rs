//! # Benefit Registry
//!
//! Per-customer, non-monetary entitlements read by scheduling code.
//!
//! ```text
//! has_benefit(customer, type)
//!      │
//!      ├── benefits_global OFF ──────────────► false
//!      ├── no row for (customer, type) ──────► false
//!      └── row.enabled ──────────────────────► true / false
//! ```
//!
//! Enabling is blocked while `benefits_global` is off; disabling never is.
//! Every toggle emits one medium-severity audit fact.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use credit_core::benefits::sla_multiplier;
use credit_core::validation::{validate_customer_id, validate_optional_reason};
use credit_core::{
    Actor, AuditEventType, AuditFact, BenefitProfile, BenefitType, CreditError, CreditResult,
    CustomerBenefit, FeatureKey, Severity, DEFAULT_FASTER_SLA_MULTIPLIER,
};

use crate::audit::{deliver, AuditSink};
use crate::gate::FeatureGate;
use crate::store::BenefitStore;

/// Reads and toggles customer benefits.
#[derive(Clone)]
pub struct BenefitRegistry {
    store: Arc<dyn BenefitStore>,
    gate: FeatureGate,
    audit: Arc<dyn AuditSink>,
    faster_sla_multiplier: f64,
}

impl BenefitRegistry {
    pub fn new(store: Arc<dyn BenefitStore>, gate: FeatureGate, audit: Arc<dyn AuditSink>) -> Self {
        BenefitRegistry {
            store,
            gate,
            audit,
            faster_sla_multiplier: DEFAULT_FASTER_SLA_MULTIPLIER,
        }
    }

    /// Overrides the multiplier granted by `faster_sla`.
    pub fn with_faster_sla_multiplier(mut self, multiplier: f64) -> Self {
        self.faster_sla_multiplier = multiplier;
        self
    }

    /// Never fails: a store error reads as "no benefit".
    pub async fn has_benefit(&self, customer_id: &str, benefit_type: BenefitType) -> bool {
        if !self.gate.is_enabled(FeatureKey::BenefitsGlobal).await {
            return false;
        }
        match self.store.get_benefit(customer_id, benefit_type).await {
            Ok(row) => row.map_or(false, |r| r.enabled),
            Err(e) => {
                warn!(customer_id, benefit = benefit_type.as_str(), error = %e, "Benefit lookup failed");
                false
            }
        }
    }

    /// SLA multiplier for scheduling. 1.0 when the lookup fails.
    pub async fn sla_multiplier(&self, customer_id: &str) -> f64 {
        let global = self.gate.is_enabled(FeatureKey::BenefitsGlobal).await;
        match self.store.benefits_for_customer(customer_id).await {
            Ok(rows) => sla_multiplier(&rows, global, self.faster_sla_multiplier),
            Err(e) => {
                warn!(customer_id, error = %e, "Benefit lookup failed");
                1.0
            }
        }
    }

    /// Every benefit flag for one customer.
    pub async fn profile(&self, customer_id: &str) -> CreditResult<BenefitProfile> {
        let global = self.gate.is_enabled(FeatureKey::BenefitsGlobal).await;
        let rows = self.store.benefits_for_customer(customer_id).await?;
        Ok(BenefitProfile::build(
            customer_id,
            &rows,
            global,
            self.faster_sla_multiplier,
        ))
    }

    /// Raw rows, including disabled ones and their history.
    pub async fn benefits(&self, customer_id: &str) -> CreditResult<Vec<CustomerBenefit>> {
        Ok(self.store.benefits_for_customer(customer_id).await?)
    }

    pub async fn enable(
        &self,
        customer_id: &str,
        benefit_type: BenefitType,
        actor: &Actor,
    ) -> CreditResult<CustomerBenefit> {
        if !actor.super_privileged {
            return Err(CreditError::unauthorized(&actor.id, "enable benefits"));
        }
        validate_customer_id(customer_id)?;
        self.gate.require(FeatureKey::BenefitsGlobal).await?;

        let row = self.toggle(customer_id, benefit_type, true, actor, None).await?;
        info!(customer_id, benefit = benefit_type.as_str(), "Benefit enabled");
        Ok(row)
    }

    pub async fn disable(
        &self,
        customer_id: &str,
        benefit_type: BenefitType,
        actor: &Actor,
        reason: Option<&str>,
    ) -> CreditResult<CustomerBenefit> {
        if !actor.super_privileged {
            return Err(CreditError::unauthorized(&actor.id, "disable benefits"));
        }
        validate_customer_id(customer_id)?;
        validate_optional_reason(reason)?;

        let row = self.toggle(customer_id, benefit_type, false, actor, reason).await?;
        info!(customer_id, benefit = benefit_type.as_str(), "Benefit disabled");
        Ok(row)
    }

    async fn toggle(
        &self,
        customer_id: &str,
        benefit_type: BenefitType,
        enabled: bool,
        actor: &Actor,
        reason: Option<&str>,
    ) -> CreditResult<CustomerBenefit> {
        let prior = self.store.get_benefit(customer_id, benefit_type).await?;
        let row = CustomerBenefit::toggled(
            prior.as_ref(),
            customer_id,
            benefit_type,
            enabled,
            &actor.id,
            reason,
            Utc::now(),
        );
        self.store.put_benefit(&row).await?;

        let event_type = if enabled {
            AuditEventType::BenefitEnabled
        } else {
            AuditEventType::BenefitDisabled
        };
        let fact = AuditFact::new(
            &actor.id,
            event_type,
            Severity::Medium,
            json!({
                "customer_id": customer_id,
                "benefit_type": benefit_type.as_str(),
                "previously_enabled": prior.map_or(false, |p| p.enabled),
                "reason": row.disabled_reason,
            }),
        );
        deliver(self.audit.as_ref(), fact).await;

        Ok(row)
    }
}
