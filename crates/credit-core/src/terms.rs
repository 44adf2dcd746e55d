//! # Credit Terms Rules
//!
//! Read-side helpers (utilization, available credit, can-cover) and the pure
//! state transitions the mutation service applies to a [`CreditTerms`]
//! snapshot before writing it back.
//!
//! ## Reader Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Readers may observe a snapshot taken mid-write, where balance briefly  │
//! │  exceeds limit. They NEVER fail on it, they clamp:                      │
//! │                                                                         │
//! │    utilization(balance, limit)  ∈ [0, 100]   (limit 0 → 0)              │
//! │    available_credit(limit, bal) ≥ 0                                     │
//! │    can_cover(None, _)           = false                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Writer Contract
//! Every transition returns a NEW snapshot with `version + 1` and
//! `updated_at = now`; the store writes it only if the stored version still
//! equals the snapshot's original version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CreditError, CreditResult};
use crate::money::Money;
use crate::types::{CreditStatus, CreditTerms, NetTerms};

// =============================================================================
// Read Helpers
// =============================================================================

/// Percentage of the limit currently outstanding, rounded half-up.
///
/// ## Example
/// ```rust
/// use credit_core::money::Money;
/// use credit_core::terms::utilization;
///
/// assert_eq!(utilization(Money::from_major(4000), Money::from_major(5000)), 80);
/// assert_eq!(utilization(Money::from_major(10), Money::zero()), 0);
/// assert_eq!(utilization(Money::from_major(6000), Money::from_major(5000)), 100);
/// ```
pub fn utilization(balance: Money, limit: Money) -> u32 {
    if !limit.is_positive() {
        return 0;
    }
    let balance = balance.non_negative().cents() as i128;
    let limit = limit.cents() as i128;
    let pct = (200 * balance + limit) / (2 * limit);
    pct.clamp(0, 100) as u32
}

/// `max(0, limit - balance)`.
#[inline]
pub fn available_credit(limit: Money, balance: Money) -> Money {
    limit.saturating_sub(balance)
}

/// Whether a total can be placed on credit right now.
///
/// `false` for a missing record, a non-active record, a zero limit, or a
/// total above the available credit.
pub fn can_cover(terms: Option<&CreditTerms>, total: Money) -> bool {
    match terms {
        Some(t) => t.is_usable() && total <= t.available_credit(),
        None => false,
    }
}

impl CreditTerms {
    /// Active with a positive limit.
    pub fn is_usable(&self) -> bool {
        self.status == CreditStatus::Active && self.credit_limit_cents > 0
    }

    pub fn available_credit(&self) -> Money {
        available_credit(self.credit_limit(), self.current_balance())
    }

    pub fn utilization(&self) -> u32 {
        utilization(self.current_balance(), self.credit_limit())
    }

    /// Why the terms cannot be used, or `None` if they can.
    pub fn unusable_reason(&self) -> Option<String> {
        if self.status != CreditStatus::Active {
            Some(format!("credit terms are {}", self.status))
        } else if self.credit_limit_cents <= 0 {
            Some("credit limit is zero".to_string())
        } else {
            None
        }
    }
}

// =============================================================================
// Credit Summary
// =============================================================================

/// Snapshot of a customer's credit position for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditSummary {
    pub customer_id: String,
    pub status: CreditStatus,
    pub net_terms: NetTerms,
    pub credit_limit: Money,
    pub current_balance: Money,
    pub available_credit: Money,
    pub utilization_percent: u32,
    pub usable: bool,
}

impl From<&CreditTerms> for CreditSummary {
    fn from(terms: &CreditTerms) -> Self {
        CreditSummary {
            customer_id: terms.customer_id.clone(),
            status: terms.status,
            net_terms: terms.net_terms,
            credit_limit: terms.credit_limit(),
            current_balance: terms.current_balance(),
            available_credit: terms.available_credit(),
            utilization_percent: terms.utilization(),
            usable: terms.is_usable(),
        }
    }
}

// =============================================================================
// State Transitions
// =============================================================================

impl CreditTerms {
    /// First-time approval: active, zero balance, version 1.
    pub fn approved(
        customer_id: impl Into<String>,
        limit: Money,
        net_terms: NetTerms,
        approved_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        CreditTerms {
            customer_id: customer_id.into(),
            credit_limit_cents: limit.cents(),
            current_balance_cents: 0,
            status: CreditStatus::Active,
            net_terms,
            suspended_reason: None,
            suspended_at: None,
            approved_by: approved_by.into(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    fn next(&self, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.version = self.version + 1;
        next.updated_at = now;
        next
    }

    fn invalid(&self, operation: &str) -> CreditError {
        CreditError::invalid_transition(&self.customer_id, self.status.as_str(), operation)
    }

    fn check_limit(&self, limit: Money) -> CreditResult<()> {
        if limit < self.current_balance() {
            return Err(CreditError::LimitBelowBalance {
                requested_limit: limit,
                current_balance: self.current_balance(),
            });
        }
        Ok(())
    }

    /// Re-approval of inactive terms. The outstanding balance carries over.
    pub fn reapproved(
        &self,
        limit: Money,
        net_terms: NetTerms,
        approved_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> CreditResult<Self> {
        if self.status != CreditStatus::Inactive {
            return Err(self.invalid("approve"));
        }
        self.check_limit(limit)?;

        let mut next = self.next(now);
        next.status = CreditStatus::Active;
        next.credit_limit_cents = limit.cents();
        next.net_terms = net_terms;
        next.approved_by = approved_by.into();
        Ok(next)
    }

    /// New limit; never below the outstanding balance.
    pub fn with_limit(&self, limit: Money, now: DateTime<Utc>) -> CreditResult<Self> {
        self.check_limit(limit)?;
        let mut next = self.next(now);
        next.credit_limit_cents = limit.cents();
        Ok(next)
    }

    /// Suspends active terms.
    ///
    /// Returns `Ok(None)` when already suspended: the original reason and
    /// timestamp stay in place and nothing needs writing.
    pub fn suspended(&self, reason: &str, now: DateTime<Utc>) -> CreditResult<Option<Self>> {
        match self.status {
            CreditStatus::Suspended => Ok(None),
            CreditStatus::Inactive => Err(self.invalid("suspend")),
            CreditStatus::Active => {
                let mut next = self.next(now);
                next.status = CreditStatus::Suspended;
                next.suspended_reason = Some(reason.to_string());
                next.suspended_at = Some(now);
                Ok(Some(next))
            }
        }
    }

    /// Lifts a suspension. Only valid from `suspended`.
    pub fn reactivated(&self, now: DateTime<Utc>) -> CreditResult<Self> {
        if self.status != CreditStatus::Suspended {
            return Err(self.invalid("reactivate"));
        }
        let mut next = self.next(now);
        next.status = CreditStatus::Active;
        next.suspended_reason = None;
        next.suspended_at = None;
        Ok(next)
    }

    /// Closes the terms. Outstanding obligations still settle afterwards.
    pub fn deactivated(&self, now: DateTime<Utc>) -> CreditResult<Self> {
        if self.status == CreditStatus::Inactive {
            return Err(self.invalid("deactivate"));
        }
        let mut next = self.next(now);
        next.status = CreditStatus::Inactive;
        next.suspended_reason = None;
        next.suspended_at = None;
        Ok(next)
    }

    /// Places `total` on credit.
    ///
    /// ## Errors
    /// - `CreditNotUsable` when not active or the limit is zero
    /// - `InsufficientCredit` when `total` exceeds the available credit
    pub fn charged(&self, total: Money, now: DateTime<Utc>) -> CreditResult<Self> {
        if let Some(reason) = self.unusable_reason() {
            return Err(CreditError::not_usable(&self.customer_id, reason));
        }

        let available = self.available_credit();
        if total > available {
            return Err(CreditError::InsufficientCredit {
                requested: total,
                available,
                shortfall: total - available,
            });
        }

        let mut next = self.next(now);
        next.current_balance_cents += total.cents();
        Ok(next)
    }

    /// Releases `amount` of the balance, flooring at zero. Any status.
    pub fn credited(&self, amount: Money, now: DateTime<Utc>) -> Self {
        let mut next = self.next(now);
        next.current_balance_cents = self.current_balance().saturating_sub(amount).cents();
        next
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn terms(limit: i64, balance: i64, status: CreditStatus) -> CreditTerms {
        let mut t = CreditTerms::approved(
            "CUST-1",
            Money::from_major(limit),
            NetTerms::Net30,
            "admin",
            Utc::now(),
        );
        t.current_balance_cents = Money::from_major(balance).cents();
        t.status = status;
        t
    }

    #[test]
    fn test_utilization_rounds_half_up() {
        assert_eq!(utilization(Money::from_cents(1), Money::from_cents(200)), 1);
        assert_eq!(utilization(Money::from_cents(1), Money::from_cents(201)), 0);
        assert_eq!(utilization(Money::from_cents(333), Money::from_cents(1000)), 33);
        assert_eq!(utilization(Money::from_cents(335), Money::from_cents(1000)), 34);
    }

    #[test]
    fn test_available_credit_never_negative() {
        assert_eq!(
            available_credit(Money::from_major(100), Money::from_major(150)),
            Money::zero()
        );
    }

    #[test]
    fn test_can_cover_boundaries() {
        let t = terms(5000, 4000, CreditStatus::Active);
        assert!(can_cover(Some(&t), Money::from_major(1000)));
        assert!(!can_cover(Some(&t), Money::from_major(1001)));
        assert!(!can_cover(None, Money::from_cents(1)));

        let suspended = terms(10_000, 0, CreditStatus::Suspended);
        assert!(!can_cover(Some(&suspended), Money::from_cents(1)));

        let zero = terms(0, 0, CreditStatus::Active);
        assert!(!can_cover(Some(&zero), Money::zero()));
    }

    #[test]
    fn test_charged_exact_limit() {
        let t = terms(5000, 0, CreditStatus::Active);
        let next = t.charged(Money::from_major(5000), Utc::now()).unwrap();
        assert_eq!(next.current_balance(), Money::from_major(5000));
        assert_eq!(next.available_credit(), Money::zero());
        assert_eq!(next.version, t.version + 1);
    }

    #[test]
    fn test_charged_reports_shortfall() {
        let t = terms(5000, 0, CreditStatus::Active);
        let err = t.charged(Money::from_major(5001), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            CreditError::InsufficientCredit {
                requested: Money::from_major(5001),
                available: Money::from_major(5000),
                shortfall: Money::from_major(1),
            }
        );
    }

    #[test]
    fn test_charged_rejects_unusable_terms() {
        let t = terms(5000, 0, CreditStatus::Suspended);
        let err = t.charged(Money::from_major(1), Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "credit_not_usable");
    }

    #[test]
    fn test_with_limit_below_balance() {
        let t = terms(5000, 3000, CreditStatus::Active);
        let err = t.with_limit(Money::from_major(2999), Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "limit_below_balance");
        assert!(t.with_limit(Money::from_major(3000), Utc::now()).is_ok());
    }

    #[test]
    fn test_suspend_is_idempotent() {
        let t = terms(5000, 1200, CreditStatus::Active);
        let suspended = t.suspended("dispute", Utc::now()).unwrap().unwrap();
        assert_eq!(suspended.status, CreditStatus::Suspended);
        assert_eq!(suspended.current_balance(), Money::from_major(1200));
        assert_eq!(suspended.suspended_reason.as_deref(), Some("dispute"));

        assert!(suspended.suspended("again", Utc::now()).unwrap().is_none());
    }

    #[test]
    fn test_suspend_reactivate_restores_active() {
        let t = terms(5000, 1200, CreditStatus::Active);
        let suspended = t.suspended("dispute", Utc::now()).unwrap().unwrap();
        let back = suspended.reactivated(Utc::now()).unwrap();
        assert_eq!(back.status, CreditStatus::Active);
        assert_eq!(back.current_balance(), t.current_balance());
        assert!(back.suspended_reason.is_none());
        assert!(back.suspended_at.is_none());
    }

    #[test]
    fn test_reactivate_requires_suspended() {
        let t = terms(5000, 0, CreditStatus::Active);
        let err = t.reactivated(Utc::now()).unwrap_err();
        assert_eq!(
            err,
            CreditError::invalid_transition("CUST-1", "active", "reactivate")
        );
    }

    #[test]
    fn test_deactivate_then_reapprove_keeps_balance() {
        let t = terms(5000, 800, CreditStatus::Active);
        let closed = t.deactivated(Utc::now()).unwrap();
        assert!(closed.deactivated(Utc::now()).is_err());
        assert!(closed.suspended("x", Utc::now()).is_err());

        let err = closed
            .reapproved(Money::from_major(500), NetTerms::Net14, "admin", Utc::now())
            .unwrap_err();
        assert_eq!(err.kind(), "limit_below_balance");

        let reopened = closed
            .reapproved(Money::from_major(2000), NetTerms::Net14, "admin", Utc::now())
            .unwrap();
        assert_eq!(reopened.status, CreditStatus::Active);
        assert_eq!(reopened.current_balance(), Money::from_major(800));
        assert_eq!(reopened.net_terms, NetTerms::Net14);
    }

    #[test]
    fn test_credited_floors_at_zero() {
        let t = terms(5000, 100, CreditStatus::Inactive);
        let next = t.credited(Money::from_major(250), Utc::now());
        assert_eq!(next.current_balance(), Money::zero());
    }

    #[test]
    fn test_summary_from_terms() {
        let t = terms(5000, 4000, CreditStatus::Active);
        let summary = CreditSummary::from(&t);
        assert_eq!(summary.available_credit, Money::from_major(1000));
        assert_eq!(summary.utilization_percent, 80);
        assert!(summary.usable);
    }

    proptest! {
        #[test]
        fn prop_utilization_in_range(balance in -1_000_000i64..10_000_000, limit in -1_000i64..10_000_000) {
            let pct = utilization(Money::from_cents(balance), Money::from_cents(limit));
            prop_assert!(pct <= 100);
            if limit <= 0 {
                prop_assert_eq!(pct, 0);
            }
            if limit > 0 && balance >= limit {
                prop_assert_eq!(pct, 100);
            }
        }

        #[test]
        fn prop_available_credit_non_negative(limit in 0i64..10_000_000, balance in 0i64..20_000_000) {
            let available = available_credit(Money::from_cents(limit), Money::from_cents(balance));
            prop_assert!(!available.is_negative());
            prop_assert!(available.cents() <= limit);
        }

        #[test]
        fn prop_can_cover_false_when_unusable(limit in 0i64..1_000_000, total in 0i64..1_000_000) {
            let mut t = terms(0, 0, CreditStatus::Suspended);
            t.credit_limit_cents = limit;
            prop_assert!(!can_cover(Some(&t), Money::from_cents(total)));

            t.status = CreditStatus::Active;
            t.credit_limit_cents = 0;
            prop_assert!(!can_cover(Some(&t), Money::from_cents(total)));
        }

        #[test]
        fn prop_balance_stays_within_limit(
            limit in 1i64..1_000_000,
            ops in proptest::collection::vec((any::<bool>(), 1i64..500_000), 1..50),
        ) {
            let mut t = terms(0, 0, CreditStatus::Active);
            t.credit_limit_cents = limit;
            for (is_apply, amount) in ops {
                let amount = Money::from_cents(amount);
                t = if is_apply {
                    t.charged(amount, Utc::now()).unwrap_or(t)
                } else {
                    t.credited(amount, Utc::now())
                };
                prop_assert!(t.current_balance_cents >= 0);
                prop_assert!(t.current_balance_cents <= t.credit_limit_cents);
            }
        }
    }
}
