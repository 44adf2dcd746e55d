//! # Validation Module
//!
//! Input validation for credit operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CRM API layer                                                │
//! │  ├── Deserialization (types, enums)                                    │
//! │  └── Authentication, actor resolution                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Mutation service                                             │
//! │  ├── Authorization (checked before this layer)                         │
//! │  └── THIS MODULE: identifiers, amounts, reasons                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (balance >= 0, limit >= 0)                                  │
//! │  └── UNIQUE (ledger order_id)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use credit_core::validation::{validate_customer_id, validate_order_total};
//!
//! validate_customer_id("CUST-001").unwrap();
//! validate_order_total(12_500).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_CREDIT_LIMIT_CENTS, MAX_ID_LENGTH, MAX_REASON_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates an opaque identifier (customer, order, actor).
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most [`MAX_ID_LENGTH`] characters
/// - No whitespace or control characters inside
fn validate_identifier(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LENGTH,
        });
    }

    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a customer id.
///
/// ## Example
/// ```rust
/// use credit_core::validation::validate_customer_id;
///
/// assert!(validate_customer_id("ACME-42").is_ok());
/// assert!(validate_customer_id("").is_err());
/// assert!(validate_customer_id("has space").is_err());
/// ```
pub fn validate_customer_id(customer_id: &str) -> ValidationResult<()> {
    validate_identifier("customer_id", customer_id)
}

/// Validates an order id.
pub fn validate_order_id(order_id: &str) -> ValidationResult<()> {
    validate_identifier("order_id", order_id)
}

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates a credit limit in cents.
///
/// ## Rules
/// - Zero is allowed (terms exist but cannot be used)
/// - Must not exceed `max_cents`
///
/// ## Example
/// ```rust
/// use credit_core::validation::validate_credit_limit;
///
/// assert!(validate_credit_limit(500_000, 1_000_000).is_ok());
/// assert!(validate_credit_limit(0, 1_000_000).is_ok());
/// assert!(validate_credit_limit(-1, 1_000_000).is_err());
/// assert!(validate_credit_limit(1_000_001, 1_000_000).is_err());
/// ```
pub fn validate_credit_limit(cents: i64, max_cents: i64) -> ValidationResult<()> {
    let max = max_cents.min(MAX_CREDIT_LIMIT_CENTS);
    if !(0..=max).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "credit_limit".to_string(),
            min: 0,
            max,
        });
    }

    Ok(())
}

/// Validates an order total in cents. Must be positive.
pub fn validate_order_total(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "order_total".to_string(),
        });
    }

    Ok(())
}

/// Validates a settlement amount in cents.
///
/// Positive, and no larger than the largest credit limit the engine can
/// grant; no single order can owe more than that.
pub fn validate_settlement_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "settlement amount".to_string(),
        });
    }
    if cents > MAX_CREDIT_LIMIT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "settlement amount".to_string(),
            min: 1,
            max: MAX_CREDIT_LIMIT_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Reason Validators
// =============================================================================

/// Validates a mandatory reason (suspension, deactivation).
pub fn validate_reason(reason: &str) -> ValidationResult<()> {
    if reason.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }
    validate_optional_reason(Some(reason))
}

/// Validates an optional reason (limit change, disabling a flag or benefit).
pub fn validate_optional_reason(reason: Option<&str>) -> ValidationResult<()> {
    match reason {
        Some(r) if r.chars().count() > MAX_REASON_LENGTH => Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: MAX_REASON_LENGTH,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
