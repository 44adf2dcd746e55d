//! # Eligibility Evaluator
//!
//! Decides whether a customer qualifies for credit terms.
//!
//! ## Rules (all must hold)
//! ```text
//! ┌──────────────────────────────┬───────────────────────────────────┐
//! │ Rule                         │ Message when failing              │
//! ├──────────────────────────────┼───────────────────────────────────┤
//! │ lifetime_orders >= 2         │ "need 2+ orders"                  │
//! │ loyalty_tier >= silver       │ "need silver tier or above"       │
//! │ no overdue invoices          │ "resolve overdue invoices"        │
//! └──────────────────────────────┴───────────────────────────────────┘
//! ```
//! Failing rules are reported in this order. The evaluator never consults
//! the kill switches; gating is the mutation service's job.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{CustomerHistory, LoyaltyTier};

/// Thresholds used by [`evaluate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    pub min_lifetime_orders: u32,
    pub min_loyalty_tier: LoyaltyTier,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        EligibilityPolicy {
            min_lifetime_orders: 2,
            min_loyalty_tier: LoyaltyTier::Silver,
        }
    }
}

/// Outcome of an eligibility check, echoing the inputs it was based on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EligibilityResult {
    pub eligible: bool,
    pub missing_requirements: Vec<String>,
    pub lifetime_orders: u32,
    pub loyalty_tier: LoyaltyTier,
    pub has_overdue_invoices: bool,
}

/// Evaluates `history` against the default policy (2 orders, silver tier).
///
/// ## Example
/// ```rust
/// use credit_core::eligibility::evaluate;
/// use credit_core::types::{CustomerHistory, LoyaltyTier};
///
/// let result = evaluate(&CustomerHistory {
///     lifetime_orders: 1,
///     loyalty_tier: LoyaltyTier::Silver,
///     has_overdue_invoices: false,
/// });
/// assert!(!result.eligible);
/// assert_eq!(result.missing_requirements, vec!["need 2+ orders"]);
/// ```
pub fn evaluate(history: &CustomerHistory) -> EligibilityResult {
    evaluate_with(history, &EligibilityPolicy::default())
}

/// Evaluates `history` against an explicit policy.
pub fn evaluate_with(history: &CustomerHistory, policy: &EligibilityPolicy) -> EligibilityResult {
    let mut missing = Vec::new();

    if history.lifetime_orders < policy.min_lifetime_orders {
        missing.push(format!("need {}+ orders", policy.min_lifetime_orders));
    }

    if history.loyalty_tier < policy.min_loyalty_tier {
        missing.push(format!("need {} tier or above", policy.min_loyalty_tier));
    }

    if history.has_overdue_invoices {
        missing.push("resolve overdue invoices".to_string());
    }

    EligibilityResult {
        eligible: missing.is_empty(),
        missing_requirements: missing,
        lifetime_orders: history.lifetime_orders,
        loyalty_tier: history.loyalty_tier,
        has_overdue_invoices: history.has_overdue_invoices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(orders: u32, tier: LoyaltyTier, overdue: bool) -> CustomerHistory {
        CustomerHistory {
            lifetime_orders: orders,
            loyalty_tier: tier,
            has_overdue_invoices: overdue,
        }
    }

    #[test]
    fn test_qualified_customer_is_eligible() {
        let result = evaluate(&history(2, LoyaltyTier::Silver, false));
        assert!(result.eligible);
        assert!(result.missing_requirements.is_empty());
        assert_eq!(result.lifetime_orders, 2);
    }

    #[test]
    fn test_single_order_customer_is_not_eligible() {
        let result = evaluate(&history(1, LoyaltyTier::Silver, false));
        assert!(!result.eligible);
        assert_eq!(result.missing_requirements, vec!["need 2+ orders"]);
    }

    #[test]
    fn test_all_failures_reported_in_order() {
        let result = evaluate(&history(0, LoyaltyTier::Bronze, true));
        assert_eq!(
            result.missing_requirements,
            vec![
                "need 2+ orders",
                "need silver tier or above",
                "resolve overdue invoices"
            ]
        );
        assert!(result.has_overdue_invoices);
    }

    #[test]
    fn test_higher_tiers_pass_tier_rule() {
        for tier in [LoyaltyTier::Gold, LoyaltyTier::Platinum] {
            assert!(evaluate(&history(10, tier, false)).eligible);
        }
    }

    #[test]
    fn test_custom_policy_thresholds() {
        let policy = EligibilityPolicy {
            min_lifetime_orders: 5,
            min_loyalty_tier: LoyaltyTier::Gold,
        };
        let result = evaluate_with(&history(3, LoyaltyTier::Silver, false), &policy);
        assert_eq!(
            result.missing_requirements,
            vec!["need 5+ orders", "need gold tier or above"]
        );
    }
}
