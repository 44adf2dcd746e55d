//! # credit-core: Pure Credit Rules
//!
//! This crate holds every credit rule as a pure function or a pure method on a
//! domain type. Nothing here touches a database, a lock or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Credit Engine Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 CRM API layer (outside the engine)              │   │
//! │  │     approve, apply at checkout, settle on payment capture       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 credit-engine (mutation service)                │   │
//! │  │     authorization → gate → lock → rules → write → audit         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ credit-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌───────────┐      │   │
//! │  │   │   money   │ │   terms   │ │  ledger   │ │eligibility│      │   │
//! │  │   │   types   │ │ available │ │  overdue  │ │ benefits  │      │   │
//! │  │   └───────────┘ └───────────┘ └───────────┘ └───────────┘      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOCKS • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 credit-db (SQLite repositories)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic
//! - [`types`] - Domain types (CreditTerms, LedgerEntry, FeatureFlag, ...)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`eligibility`] - Who may be granted credit
//! - [`terms`] - Utilization, available credit and status transitions
//! - [`ledger`] - Outstanding, overdue and next-due derivation
//! - [`benefits`] - Benefit lookups and SLA multiplier
//!
//! ## Example Usage
//!
//! ```rust
//! use credit_core::money::Money;
//! use credit_core::terms::{available_credit, utilization};
//!
//! let limit = Money::from_major(5000);
//! let balance = Money::from_major(4000);
//!
//! assert_eq!(available_credit(limit, balance), Money::from_major(1000));
//! assert_eq!(utilization(balance, limit), 80);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod benefits;
pub mod eligibility;
pub mod error;
pub mod ledger;
pub mod money;
pub mod terms;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use eligibility::{evaluate, evaluate_with, EligibilityPolicy, EligibilityResult};
pub use error::{CreditError, CreditResult, ValidationError};
pub use benefits::BenefitProfile;
pub use ledger::{LedgerSummary, OverdueNotice};
pub use money::Money;
pub use terms::CreditSummary;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Actor id used by engine-internal pipelines (order placement, payment capture).
pub const SYSTEM_ACTOR_ID: &str = "system";

/// Largest credit limit the engine will grant by default ($10,000,000.00).
///
/// Deployments may lower it through configuration.
pub const MAX_CREDIT_LIMIT_CENTS: i64 = 1_000_000_000;

/// Maximum length of customer, order and actor identifiers.
pub const MAX_ID_LENGTH: usize = 64;

/// Maximum length of suspension / disable reasons.
pub const MAX_REASON_LENGTH: usize = 500;

/// SLA multiplier applied when `faster_sla` is enabled and nothing else is configured.
pub const DEFAULT_FASTER_SLA_MULTIPLIER: f64 = 0.75;
