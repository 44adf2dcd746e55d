//! # Ledger Derivation
//!
//! Pure views over a customer's ledger entries at a given instant.
//!
//! ## Overdue Rule
//! ```text
//! is_overdue(entry, now) = now > entry.credit_due_date
//!                          AND payment_status ∉ {fully_paid, overpaid}
//! ```
//! Overdue is never stored; it is recomputed on every read.
//!
//! ## Outstanding vs Used
//! ```text
//!   used $500, paid $200  → outstanding $300   (partially_paid)
//!   used $500, paid $500  → outstanding $0     (fully_paid)
//!   used $500, paid $650  → outstanding $0     (overpaid; excess is not credit)
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CreditResult, ValidationError};
use crate::money::Money;
use crate::types::{LedgerEntry, NetTerms, PaymentStatus};

// =============================================================================
// Entry Behaviour
// =============================================================================

impl LedgerEntry {
    /// Records a new use of credit. The due date is frozen here.
    pub fn open(
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        amount: Money,
        net_terms: NetTerms,
        now: DateTime<Utc>,
    ) -> Self {
        LedgerEntry {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            credit_amount_used_cents: amount.cents(),
            amount_paid_cents: 0,
            payment_status: PaymentStatus::Pending,
            used_at: now,
            credit_due_date: now + Duration::days(net_terms.days()),
            settled_at: None,
        }
    }

    /// What is still owed on this order.
    pub fn outstanding(&self) -> Money {
        self.credit_amount_used().saturating_sub(self.amount_paid())
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.credit_due_date && !self.payment_status.is_settled()
    }

    /// Whole days past the due date (0 when not overdue).
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        if self.is_overdue(now) {
            (now - self.credit_due_date).num_days()
        } else {
            0
        }
    }

    /// Applies a payment.
    ///
    /// Returns the updated entry and the portion of `amount` that reduced
    /// the outstanding amount; that portion is what comes off the customer
    /// balance. Any excess only shows up as `overpaid`.
    ///
    /// Fails with `OutOfRange` when the running total of payments would no
    /// longer fit in an `i64` of cents.
    pub fn with_payment(&self, amount: Money, now: DateTime<Utc>) -> CreditResult<(LedgerEntry, Money)> {
        let amount = amount.non_negative();
        let applied = amount.min(self.outstanding());

        let mut next = self.clone();
        next.amount_paid_cents = self
            .amount_paid_cents
            .checked_add(amount.cents())
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "amount_paid".to_string(),
                min: 0,
                max: i64::MAX,
            })?;
        next.payment_status =
            PaymentStatus::from_amounts(next.credit_amount_used(), next.amount_paid());
        if next.payment_status.is_settled() && next.settled_at.is_none() {
            next.settled_at = Some(now);
        }
        Ok((next, applied))
    }
}

// =============================================================================
// Summary
// =============================================================================

/// The next obligation coming due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NextDue {
    pub order_id: String,
    #[ts(as = "String")]
    pub due_date: DateTime<Utc>,
    pub amount: Money,
}

/// Aggregate ledger view for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerSummary {
    pub entry_count: usize,
    pub total_outstanding: Money,
    pub overdue_amount: Money,
    pub overdue_count: usize,
    pub next_due: Option<NextDue>,
}

/// Aggregates `entries` (in insertion order) at `now`.
///
/// `next_due` is the earliest non-overdue unpaid entry by due date; ties go
/// to the entry recorded first.
pub fn summarize(entries: &[LedgerEntry], now: DateTime<Utc>) -> LedgerSummary {
    let open: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|e| !e.payment_status.is_settled())
        .collect();

    let total_outstanding: Money = open.iter().map(|e| e.outstanding()).sum();

    let overdue: Vec<&&LedgerEntry> = open.iter().filter(|e| e.is_overdue(now)).collect();
    let overdue_amount: Money = overdue.iter().map(|e| e.outstanding()).sum();

    let next_due = open
        .iter()
        .filter(|e| !e.is_overdue(now))
        .min_by_key(|e| e.credit_due_date)
        .map(|e| NextDue {
            order_id: e.order_id.clone(),
            due_date: e.credit_due_date,
            amount: e.outstanding(),
        });

    LedgerSummary {
        entry_count: entries.len(),
        total_outstanding,
        overdue_amount,
        overdue_count: overdue.len(),
        next_due,
    }
}

// =============================================================================
// Overdue Notices
// =============================================================================

/// Data handed to the notification collaborator for one overdue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OverdueNotice {
    pub order_id: String,
    pub customer_id: String,
    pub amount_outstanding: Money,
    #[ts(as = "String")]
    pub due_date: DateTime<Utc>,
    pub days_overdue: i64,
}

/// Overdue entries, most overdue first.
pub fn overdue_notices(entries: &[LedgerEntry], now: DateTime<Utc>) -> Vec<OverdueNotice> {
    let mut notices: Vec<OverdueNotice> = entries
        .iter()
        .filter(|e| e.is_overdue(now))
        .map(|e| OverdueNotice {
            order_id: e.order_id.clone(),
            customer_id: e.customer_id.clone(),
            amount_outstanding: e.outstanding(),
            due_date: e.credit_due_date,
            days_overdue: e.days_overdue(now),
        })
        .collect();
    notices.sort_by_key(|n| n.due_date);
    notices
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CreditError;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn entry(order: &str, dollars: i64, terms: NetTerms, used_at: DateTime<Utc>) -> LedgerEntry {
        LedgerEntry::open(order, "CUST-1", Money::from_major(dollars), terms, used_at)
    }

    #[test]
    fn test_due_date_is_used_at_plus_terms() {
        let e = entry("ORD-1", 100, NetTerms::Net14, at(1));
        assert_eq!(e.credit_due_date, at(15));
        assert_eq!(e.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn test_overdue_only_after_due_date() {
        let e = entry("ORD-1", 100, NetTerms::Net7, at(1));
        assert!(!e.is_overdue(at(8)));
        assert!(e.is_overdue(at(9)));
        assert_eq!(e.days_overdue(at(10)), 2);
    }

    #[test]
    fn test_paid_entry_is_never_overdue() {
        let e = entry("ORD-1", 100, NetTerms::Net7, at(1));
        let (paid, applied) = e.with_payment(Money::from_major(100), at(2)).unwrap();
        assert_eq!(applied, Money::from_major(100));
        assert_eq!(paid.payment_status, PaymentStatus::FullyPaid);
        assert_eq!(paid.settled_at, Some(at(2)));
        assert!(!paid.is_overdue(at(30)));
    }

    #[test]
    fn test_overpayment_applies_only_outstanding() {
        let e = entry("ORD-1", 100, NetTerms::Net30, at(1));
        let (partial, applied) = e.with_payment(Money::from_major(40), at(2)).unwrap();
        assert_eq!(applied, Money::from_major(40));
        assert_eq!(partial.payment_status, PaymentStatus::PartiallyPaid);

        let (over, applied) = partial.with_payment(Money::from_major(100), at(3)).unwrap();
        assert_eq!(applied, Money::from_major(60));
        assert_eq!(over.payment_status, PaymentStatus::Overpaid);
        assert_eq!(over.amount_paid(), Money::from_major(140));
        assert_eq!(over.outstanding(), Money::zero());
    }

    #[test]
    fn test_payment_total_overflow_is_rejected() {
        let e = entry("ORD-1", 100, NetTerms::Net30, at(1));
        let (over, applied) = e.with_payment(Money::from_cents(i64::MAX), at(2)).unwrap();
        assert_eq!(applied, Money::from_major(100));
        assert_eq!(over.payment_status, PaymentStatus::Overpaid);

        let err = over.with_payment(Money::from_cents(1), at(3)).unwrap_err();
        assert!(matches!(
            err,
            CreditError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(over.amount_paid(), Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_summarize() {
        let overdue = entry("ORD-1", 100, NetTerms::Net7, at(1));
        let (partial, _) =
            entry("ORD-2", 300, NetTerms::Net30, at(2)).with_payment(Money::from_major(50), at(3)).unwrap();
        let (paid, _) =
            entry("ORD-3", 80, NetTerms::Net7, at(2)).with_payment(Money::from_major(80), at(3)).unwrap();
        let later = entry("ORD-4", 20, NetTerms::Net60, at(2));

        let summary = summarize(&[overdue, partial, paid, later], at(20));
        assert_eq!(summary.entry_count, 4);
        assert_eq!(summary.total_outstanding, Money::from_major(100 + 250 + 20));
        assert_eq!(summary.overdue_amount, Money::from_major(100));
        assert_eq!(summary.overdue_count, 1);

        let next = summary.next_due.unwrap();
        assert_eq!(next.order_id, "ORD-2");
        assert_eq!(next.amount, Money::from_major(250));
    }

    #[test]
    fn test_next_due_ties_go_to_first_recorded() {
        let a = entry("ORD-A", 10, NetTerms::Net30, at(1));
        let b = entry("ORD-B", 10, NetTerms::Net30, at(1));
        let summary = summarize(&[a, b], at(2));
        assert_eq!(summary.next_due.unwrap().order_id, "ORD-A");
    }

    #[test]
    fn test_empty_ledger() {
        let summary = summarize(&[], at(1));
        assert_eq!(summary, LedgerSummary::default());
    }

    #[test]
    fn test_overdue_notices_most_overdue_first() {
        let older = entry("ORD-OLD", 50, NetTerms::Net7, at(1));
        let newer = entry("ORD-NEW", 70, NetTerms::Net7, at(5));
        let current = entry("ORD-CUR", 90, NetTerms::Net60, at(5));

        let notices = overdue_notices(&[newer, current, older], at(20));
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].order_id, "ORD-OLD");
        assert_eq!(notices[0].days_overdue, 12);
        assert_eq!(notices[1].amount_outstanding, Money::from_major(70));
    }
}
