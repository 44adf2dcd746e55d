//! # Credit Mutation Service
//!
//! The only writer of credit terms and ledger rows.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. authorization      Unauthorized                                     │
//! │  2. input validation   Validation                                       │
//! │  3. feature gate       FeatureDisabled          (approve, adjust, apply)│
//! │  4. eligibility        NotEligible              (approve only)          │
//! │  5. customer lock      ─── everything below runs serialized ───         │
//! │  6. business rules     InvalidTransition, LimitBelowBalance,            │
//! │                        CreditNotUsable, InsufficientCredit              │
//! │  7. write              Storage (version conflict, DB failure)           │
//! │  8. audit              failure logged, never returned                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Privileges
//! ```text
//!   approve, adjust_limit, suspend, reactivate, deactivate → super-privileged
//!   apply_to_order, settle                                 → any actor (incl. system)
//! ```
//!
//! Read paths never lock and never audit.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use credit_core::ledger::{self, LedgerSummary, OverdueNotice};
use credit_core::terms::{self, CreditSummary};
use credit_core::validation::{
    validate_credit_limit, validate_customer_id, validate_optional_reason, validate_order_id,
    validate_order_total, validate_reason, validate_settlement_amount,
};
use credit_core::{
    evaluate_with, Actor, AuditEventType, AuditFact, CreditError, CreditOrder, CreditResult,
    CreditStatus, CreditTerms, EligibilityPolicy, EligibilityResult, FeatureKey, LedgerEntry,
    Money, NetTerms, Severity, MAX_CREDIT_LIMIT_CENTS,
};

use crate::audit::{deliver, AuditSink};
use crate::error::StoreError;
use crate::gate::FeatureGate;
use crate::history::CustomerHistoryProvider;
use crate::locks::CustomerLocks;
use crate::store::CreditStore;

// =============================================================================
// Requests & Policy
// =============================================================================

/// Input to [`CreditService::approve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveRequest {
    pub customer_id: String,
    pub credit_limit: Money,
    /// `None` uses the configured default.
    pub net_terms: Option<NetTerms>,
    /// Grant terms even when eligibility fails.
    #[serde(default)]
    pub override_eligibility: bool,
}

impl ApproveRequest {
    pub fn new(customer_id: impl Into<String>, credit_limit: Money) -> Self {
        ApproveRequest {
            customer_id: customer_id.into(),
            credit_limit,
            net_terms: None,
            override_eligibility: false,
        }
    }

    pub fn net_terms(mut self, net_terms: NetTerms) -> Self {
        self.net_terms = Some(net_terms);
        self
    }

    pub fn override_eligibility(mut self) -> Self {
        self.override_eligibility = true;
        self
    }
}

/// Rules that come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePolicy {
    pub eligibility: EligibilityPolicy,
    pub max_credit_limit_cents: i64,
    pub default_net_terms: NetTerms,
}

impl Default for ServicePolicy {
    fn default() -> Self {
        ServicePolicy {
            eligibility: EligibilityPolicy::default(),
            max_credit_limit_cents: MAX_CREDIT_LIMIT_CENTS,
            default_net_terms: NetTerms::default(),
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Credit mutations and the read paths over them.
pub struct CreditService {
    store: Arc<dyn CreditStore>,
    gate: FeatureGate,
    history: Arc<dyn CustomerHistoryProvider>,
    audit: Arc<dyn AuditSink>,
    locks: CustomerLocks,
    policy: ServicePolicy,
}

impl CreditService {
    pub fn new(
        store: Arc<dyn CreditStore>,
        gate: FeatureGate,
        history: Arc<dyn CustomerHistoryProvider>,
        audit: Arc<dyn AuditSink>,
        policy: ServicePolicy,
    ) -> Self {
        CreditService {
            store,
            gate,
            history,
            audit,
            locks: CustomerLocks::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &ServicePolicy {
        &self.policy
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Grants credit terms, or re-grants them to an inactive account.
    ///
    /// ## Errors
    /// - `NotEligible` unless history passes or `override_eligibility` is set
    /// - `InvalidTransition` when the account is already active or suspended
    /// - `LimitBelowBalance` when re-approving below the carried-over balance
    pub async fn approve(&self, request: &ApproveRequest, actor: &Actor) -> CreditResult<CreditTerms> {
        let result = self.approve_inner(request, actor).await;
        rejected("approve", &request.customer_id, result)
    }

    async fn approve_inner(&self, request: &ApproveRequest, actor: &Actor) -> CreditResult<CreditTerms> {
        require_privileged(actor, "approve credit terms")?;
        validate_customer_id(&request.customer_id)?;
        validate_credit_limit(request.credit_limit.cents(), self.policy.max_credit_limit_cents)?;
        self.gate.require(FeatureKey::CreditTermsGlobal).await?;

        let eligibility = self.eligibility(&request.customer_id).await?;
        if !eligibility.eligible && !request.override_eligibility {
            return Err(CreditError::NotEligible {
                missing_requirements: eligibility.missing_requirements,
            });
        }

        let net_terms = request.net_terms.unwrap_or(self.policy.default_net_terms);
        let _guard = self.locks.acquire(&request.customer_id).await;
        let now = Utc::now();

        let (approved, reapproval) = match self.store.get_terms(&request.customer_id).await? {
            None => {
                let terms = CreditTerms::approved(
                    &request.customer_id,
                    request.credit_limit,
                    net_terms,
                    &actor.id,
                    now,
                );
                self.store.insert_terms(&terms).await?;
                (terms, false)
            }
            Some(existing) => {
                let terms = existing.reapproved(request.credit_limit, net_terms, &actor.id, now)?;
                self.store.update_terms(&terms, existing.version).await?;
                (terms, true)
            }
        };

        info!(
            customer_id = %approved.customer_id,
            limit = %approved.credit_limit(),
            net_terms = approved.net_terms.as_str(),
            reapproval,
            overridden = !eligibility.eligible,
            "Credit terms approved"
        );

        let severity = if eligibility.eligible {
            Severity::High
        } else {
            Severity::Critical
        };
        self.emit(AuditFact::new(
            &actor.id,
            AuditEventType::CreditApproved,
            severity,
            json!({
                "customer_id": approved.customer_id,
                "credit_limit_cents": approved.credit_limit_cents,
                "net_terms": approved.net_terms.as_str(),
                "reapproval": reapproval,
                "override_eligibility": request.override_eligibility,
                "missing_requirements": eligibility.missing_requirements,
            }),
        ))
        .await;

        Ok(approved)
    }

    /// Changes the limit. Never below the outstanding balance.
    pub async fn adjust_limit(
        &self,
        customer_id: &str,
        new_limit: Money,
        actor: &Actor,
        reason: Option<&str>,
    ) -> CreditResult<CreditTerms> {
        let result = self.adjust_limit_inner(customer_id, new_limit, actor, reason).await;
        rejected("adjust_limit", customer_id, result)
    }

    async fn adjust_limit_inner(
        &self,
        customer_id: &str,
        new_limit: Money,
        actor: &Actor,
        reason: Option<&str>,
    ) -> CreditResult<CreditTerms> {
        require_privileged(actor, "adjust credit limits")?;
        validate_customer_id(customer_id)?;
        validate_credit_limit(new_limit.cents(), self.policy.max_credit_limit_cents)?;
        validate_optional_reason(reason)?;
        self.gate.require(FeatureKey::CreditTermsGlobal).await?;

        let _guard = self.locks.acquire(customer_id).await;
        let existing = self.existing(customer_id, "adjust limit").await?;
        let adjusted = existing.with_limit(new_limit, Utc::now())?;
        self.store.update_terms(&adjusted, existing.version).await?;

        info!(
            customer_id,
            previous = %existing.credit_limit(),
            limit = %adjusted.credit_limit(),
            "Credit limit adjusted"
        );

        self.emit(AuditFact::new(
            &actor.id,
            AuditEventType::CreditLimitAdjusted,
            Severity::High,
            json!({
                "customer_id": customer_id,
                "previous_limit_cents": existing.credit_limit_cents,
                "new_limit_cents": adjusted.credit_limit_cents,
                "current_balance_cents": adjusted.current_balance_cents,
                "reason": reason,
            }),
        ))
        .await;

        Ok(adjusted)
    }

    /// Suspends an active account. Suspending again changes nothing but is
    /// still audited.
    pub async fn suspend(&self, customer_id: &str, actor: &Actor, reason: &str) -> CreditResult<CreditTerms> {
        let result = self.suspend_inner(customer_id, actor, reason).await;
        rejected("suspend", customer_id, result)
    }

    async fn suspend_inner(&self, customer_id: &str, actor: &Actor, reason: &str) -> CreditResult<CreditTerms> {
        require_privileged(actor, "suspend credit terms")?;
        validate_customer_id(customer_id)?;
        validate_reason(reason)?;

        let _guard = self.locks.acquire(customer_id).await;
        let existing = self.existing(customer_id, "suspend").await?;

        let (terms, already_suspended) = match existing.suspended(reason, Utc::now())? {
            Some(suspended) => {
                self.store.update_terms(&suspended, existing.version).await?;
                info!(customer_id, reason, "Credit terms suspended");
                (suspended, false)
            }
            None => {
                debug!(customer_id, "Credit terms already suspended");
                (existing, true)
            }
        };

        self.emit(AuditFact::new(
            &actor.id,
            AuditEventType::CreditSuspended,
            Severity::High,
            json!({
                "customer_id": customer_id,
                "reason": reason,
                "already_suspended": already_suspended,
                "current_balance_cents": terms.current_balance_cents,
            }),
        ))
        .await;

        Ok(terms)
    }

    /// Lifts a suspension. The balance is untouched.
    pub async fn reactivate(&self, customer_id: &str, actor: &Actor) -> CreditResult<CreditTerms> {
        let result = self.reactivate_inner(customer_id, actor).await;
        rejected("reactivate", customer_id, result)
    }

    async fn reactivate_inner(&self, customer_id: &str, actor: &Actor) -> CreditResult<CreditTerms> {
        require_privileged(actor, "reactivate credit terms")?;
        validate_customer_id(customer_id)?;

        let _guard = self.locks.acquire(customer_id).await;
        let existing = self.existing(customer_id, "reactivate").await?;
        let reactivated = existing.reactivated(Utc::now())?;
        self.store.update_terms(&reactivated, existing.version).await?;

        info!(customer_id, "Credit terms reactivated");

        self.emit(AuditFact::new(
            &actor.id,
            AuditEventType::CreditReactivated,
            Severity::Medium,
            json!({
                "customer_id": customer_id,
                "suspended_reason": existing.suspended_reason,
            }),
        ))
        .await;

        Ok(reactivated)
    }

    /// Closes an account. Outstanding orders still settle.
    pub async fn deactivate(&self, customer_id: &str, actor: &Actor, reason: &str) -> CreditResult<CreditTerms> {
        let result = self.deactivate_inner(customer_id, actor, reason).await;
        rejected("deactivate", customer_id, result)
    }

    async fn deactivate_inner(&self, customer_id: &str, actor: &Actor, reason: &str) -> CreditResult<CreditTerms> {
        require_privileged(actor, "deactivate credit terms")?;
        validate_customer_id(customer_id)?;
        validate_reason(reason)?;

        let _guard = self.locks.acquire(customer_id).await;
        let existing = self.existing(customer_id, "deactivate").await?;
        let deactivated = existing.deactivated(Utc::now())?;
        self.store.update_terms(&deactivated, existing.version).await?;

        info!(customer_id, reason, "Credit terms deactivated");

        self.emit(AuditFact::new(
            &actor.id,
            AuditEventType::CreditDeactivated,
            Severity::High,
            json!({
                "customer_id": customer_id,
                "reason": reason,
                "previous_status": existing.status.as_str(),
                "current_balance_cents": deactivated.current_balance_cents,
            }),
        ))
        .await;

        Ok(deactivated)
    }

    /// Puts an order on credit and records its ledger entry.
    ///
    /// ## Errors
    /// - `CreditNotUsable` when there are no terms, they are not active, or the limit is zero
    /// - `InvalidTransition` when the order already used credit
    /// - `InsufficientCredit` with the shortfall when the total exceeds what is available
    pub async fn apply_to_order(&self, order: &CreditOrder, actor: &Actor) -> CreditResult<LedgerEntry> {
        let result = self.apply_inner(order, actor).await;
        rejected("apply_to_order", &order.customer_id, result)
    }

    async fn apply_inner(&self, order: &CreditOrder, actor: &Actor) -> CreditResult<LedgerEntry> {
        require_authenticated(actor, "apply credit to orders")?;
        validate_customer_id(&order.customer_id)?;
        validate_order_id(&order.order_id)?;
        validate_order_total(order.total_cents)?;
        self.gate.require(FeatureKey::CreditTermsGlobal).await?;

        let customer_id = order.customer_id.as_str();
        let _guard = self.locks.acquire(customer_id).await;

        let terms = self
            .store
            .get_terms(customer_id)
            .await?
            .ok_or_else(|| CreditError::not_usable(customer_id, "no credit terms"))?;

        let operation = format!("apply credit to order {}", order.order_id);
        if self.store.ledger_entry(&order.order_id).await?.is_some() {
            return Err(CreditError::invalid_transition(
                customer_id,
                terms.status.as_str(),
                operation,
            ));
        }

        let now = Utc::now();
        let charged = terms.charged(order.total(), now)?;
        let entry = LedgerEntry::open(&order.order_id, customer_id, order.total(), terms.net_terms, now);

        match self.store.record_usage(&charged, terms.version, &entry).await {
            Ok(()) => {}
            Err(StoreError::Duplicate { .. }) => {
                return Err(CreditError::invalid_transition(
                    customer_id,
                    terms.status.as_str(),
                    operation,
                ));
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            customer_id,
            order_id = %order.order_id,
            amount = %order.total(),
            balance = %charged.current_balance(),
            due = %entry.credit_due_date,
            "Credit applied to order"
        );

        self.emit(AuditFact::new(
            &actor.id,
            AuditEventType::CreditApplied,
            Severity::Low,
            json!({
                "customer_id": customer_id,
                "order_id": order.order_id,
                "amount_cents": order.total_cents,
                "balance_after_cents": charged.current_balance_cents,
                "credit_due_date": entry.credit_due_date,
            }),
        ))
        .await;

        Ok(entry)
    }

    /// Records a payment against an order's ledger entry.
    ///
    /// Only the part of `amount` that covers what is still owed comes off
    /// the balance; the rest marks the entry overpaid. Works in any account
    /// status and regardless of the kill switch.
    pub async fn settle(&self, order_id: &str, amount: Money, actor: &Actor) -> CreditResult<LedgerEntry> {
        let result = self.settle_inner(order_id, amount, actor).await;
        rejected("settle", order_id, result)
    }

    async fn settle_inner(&self, order_id: &str, amount: Money, actor: &Actor) -> CreditResult<LedgerEntry> {
        require_authenticated(actor, "settle credit")?;
        validate_order_id(order_id)?;
        validate_settlement_amount(amount.cents())?;

        let operation = format!("settle order {}", order_id);
        let customer_id = match self.store.ledger_entry(order_id).await? {
            Some(entry) => entry.customer_id,
            None => return Err(CreditError::invalid_transition("unknown", "missing", operation)),
        };

        let _guard = self.locks.acquire(&customer_id).await;

        // Re-read under the lock; a concurrent settlement may have landed.
        let entry = self
            .store
            .ledger_entry(order_id)
            .await?
            .ok_or_else(|| CreditError::invalid_transition(&customer_id, "missing", &operation))?;
        let terms = self.existing(&customer_id, &operation).await?;

        let now = Utc::now();
        let (paid, applied) = entry.with_payment(amount, now)?;
        let credited = terms.credited(applied, now);
        self.store.record_settlement(&credited, terms.version, &paid).await?;

        info!(
            customer_id = %customer_id,
            order_id,
            amount = %amount,
            applied = %applied,
            status = paid.payment_status.as_str(),
            balance = %credited.current_balance(),
            "Settlement recorded"
        );

        self.emit(AuditFact::new(
            &actor.id,
            AuditEventType::CreditSettled,
            Severity::Low,
            json!({
                "customer_id": customer_id,
                "order_id": order_id,
                "amount_cents": amount.cents(),
                "applied_cents": applied.cents(),
                "payment_status": paid.payment_status.as_str(),
                "balance_after_cents": credited.current_balance_cents,
            }),
        ))
        .await;

        Ok(paid)
    }

    // =========================================================================
    // Read Paths
    // =========================================================================

    pub async fn terms(&self, customer_id: &str) -> CreditResult<Option<CreditTerms>> {
        Ok(self.store.get_terms(customer_id).await?)
    }

    pub async fn credit_summary(&self, customer_id: &str) -> CreditResult<Option<CreditSummary>> {
        let terms = self.store.get_terms(customer_id).await?;
        Ok(terms.as_ref().map(CreditSummary::from))
    }

    /// Whether `total` could go on credit right now. False while the credit
    /// kill switch is off.
    pub async fn can_cover(&self, customer_id: &str, total: Money) -> CreditResult<bool> {
        // An unreadable switch answers "no", like an explicit OFF.
        if self.gate.require(FeatureKey::CreditTermsGlobal).await.is_err() {
            return Ok(false);
        }
        let terms = self.store.get_terms(customer_id).await?;
        Ok(terms::can_cover(terms.as_ref(), total))
    }

    /// Current eligibility, for display. Does not consult the kill switch.
    pub async fn eligibility(&self, customer_id: &str) -> CreditResult<EligibilityResult> {
        let history = self.history.history(customer_id).await?;
        Ok(evaluate_with(&history, &self.policy.eligibility))
    }

    pub async fn accounts_with_status(&self, status: CreditStatus) -> CreditResult<Vec<CreditTerms>> {
        Ok(self.store.terms_with_status(status).await?)
    }

    /// Ledger entries in the order they were recorded.
    pub async fn ledger(&self, customer_id: &str) -> CreditResult<Vec<LedgerEntry>> {
        Ok(self.store.ledger_for_customer(customer_id).await?)
    }

    pub async fn ledger_entry(&self, order_id: &str) -> CreditResult<Option<LedgerEntry>> {
        Ok(self.store.ledger_entry(order_id).await?)
    }

    pub async fn ledger_summary(&self, customer_id: &str) -> CreditResult<LedgerSummary> {
        self.ledger_summary_at(customer_id, Utc::now()).await
    }

    pub async fn ledger_summary_at(
        &self,
        customer_id: &str,
        now: DateTime<Utc>,
    ) -> CreditResult<LedgerSummary> {
        let entries = self.store.ledger_for_customer(customer_id).await?;
        Ok(ledger::summarize(&entries, now))
    }

    pub async fn overdue_notices(&self, customer_id: &str) -> CreditResult<Vec<OverdueNotice>> {
        self.overdue_notices_at(customer_id, Utc::now()).await
    }

    pub async fn overdue_notices_at(
        &self,
        customer_id: &str,
        now: DateTime<Utc>,
    ) -> CreditResult<Vec<OverdueNotice>> {
        let entries = self.store.ledger_for_customer(customer_id).await?;
        Ok(ledger::overdue_notices(&entries, now))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn existing(&self, customer_id: &str, operation: &str) -> CreditResult<CreditTerms> {
        self.store
            .get_terms(customer_id)
            .await?
            .ok_or_else(|| CreditError::invalid_transition(customer_id, "missing", operation))
    }

    async fn emit(&self, fact: AuditFact) {
        deliver(self.audit.as_ref(), fact).await;
    }
}

fn require_privileged(actor: &Actor, operation: &str) -> CreditResult<()> {
    if actor.super_privileged {
        Ok(())
    } else {
        Err(CreditError::unauthorized(&actor.id, operation))
    }
}

fn require_authenticated(actor: &Actor, operation: &str) -> CreditResult<()> {
    if actor.id.trim().is_empty() {
        Err(CreditError::unauthorized(&actor.id, operation))
    } else {
        Ok(())
    }
}

fn rejected<T>(operation: &str, subject: &str, result: CreditResult<T>) -> CreditResult<T> {
    if let Err(ref e) = result {
        warn!(operation, subject, kind = e.kind(), error = %e, "Credit mutation rejected");
    }
    result
}
