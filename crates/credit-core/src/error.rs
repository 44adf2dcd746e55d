//! # Error Types
//!
//! Domain-specific error types for credit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  credit-core errors (this file)                                        │
//! │  ├── CreditError      - Typed outcomes of every credit operation       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  credit-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  credit-engine errors                                                  │
//! │  ├── StoreError       - Store failures → CreditError::Storage          │
//! │  └── AuditError       - Sink failures (logged, never returned)         │
//! │                                                                         │
//! │  Flow: ValidationError → CreditError ← StoreError ← DbError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Check Order
//! Every mutating operation reports the FIRST failing check, in this order:
//! `Unauthorized` → `Validation` → `FeatureDisabled` → business rules.
//! An unauthorized caller therefore learns nothing about the account.

use thiserror::Error;

use crate::money::Money;
use crate::types::FeatureKey;

// =============================================================================
// Credit Error
// =============================================================================

/// Outcomes of credit operations that callers are expected to branch on.
///
/// Every variant carries the structured data the consuming layer needs to
/// show a specific message (shortfall amount, missing requirements, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreditError {
    /// Actor lacks the super-privileged capability.
    #[error("Actor {actor_id} is not authorized to {operation}")]
    Unauthorized { actor_id: String, operation: String },

    /// The relevant kill switch is off.
    #[error("Feature {key} is disabled")]
    FeatureDisabled { key: FeatureKey },

    /// Approval attempted for a customer who does not qualify.
    ///
    /// ## User Workflow
    /// ```text
    /// Approve credit for ACME
    ///      │
    ///      ▼
    /// evaluate(history) → lifetime_orders = 1
    ///      │
    ///      ▼
    /// NotEligible { missing_requirements: ["need 2+ orders"] }
    ///      │
    ///      ▼
    /// UI shows the checklist of what is missing
    /// ```
    #[error("Customer is not eligible for credit terms: {}", .missing_requirements.join(", "))]
    NotEligible { missing_requirements: Vec<String> },

    /// The account is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Reactivating an account that is not suspended
    /// - Suspending or adjusting an account that does not exist
    /// - Applying credit twice to the same order
    #[error("Cannot {operation} credit terms for {customer_id} in state {from}")]
    InvalidTransition {
        customer_id: String,
        from: String,
        operation: String,
    },

    /// A limit change would drop below the outstanding balance.
    #[error("Credit limit {requested_limit} is below current balance {current_balance}")]
    LimitBelowBalance {
        requested_limit: Money,
        current_balance: Money,
    },

    /// Credit exists but cannot be used (not active, or zero limit).
    #[error("Credit terms for {customer_id} are not usable: {reason}")]
    CreditNotUsable { customer_id: String, reason: String },

    /// Order total exceeds available credit.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout: order total $5001.00
    ///      │
    ///      ▼
    /// available = $5000.00
    ///      │
    ///      ▼
    /// InsufficientCredit { shortfall: $1.00 }
    ///      │
    ///      ▼
    /// UI shows: "Pay $1.00 upfront or reduce the order"
    /// ```
    #[error("Insufficient credit: requested {requested}, available {available}, short by {shortfall}")]
    InsufficientCredit {
        requested: Money,
        available: Money,
        shortfall: Money,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The primary write (or the read it depends on) failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CreditError {
    /// Creates an Unauthorized error.
    pub fn unauthorized(actor_id: impl Into<String>, operation: impl Into<String>) -> Self {
        CreditError::Unauthorized {
            actor_id: actor_id.into(),
            operation: operation.into(),
        }
    }

    /// Creates an InvalidTransition error.
    pub fn invalid_transition(
        customer_id: impl Into<String>,
        from: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        CreditError::InvalidTransition {
            customer_id: customer_id.into(),
            from: from.into(),
            operation: operation.into(),
        }
    }

    /// Creates a CreditNotUsable error.
    pub fn not_usable(customer_id: impl Into<String>, reason: impl Into<String>) -> Self {
        CreditError::CreditNotUsable {
            customer_id: customer_id.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable name of the error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CreditError::Unauthorized { .. } => "unauthorized",
            CreditError::FeatureDisabled { .. } => "feature_disabled",
            CreditError::NotEligible { .. } => "not_eligible",
            CreditError::InvalidTransition { .. } => "invalid_transition",
            CreditError::LimitBelowBalance { .. } => "limit_below_balance",
            CreditError::CreditNotUsable { .. } => "credit_not_usable",
            CreditError::InsufficientCredit { .. } => "insufficient_credit",
            CreditError::Validation(_) => "validation",
            CreditError::Storage(_) => "storage",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unknown enum value).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CreditError.
pub type CreditResult<T> = Result<T, CreditError>;

// =============================================================================
// Unit Tests
// =============================================================================
