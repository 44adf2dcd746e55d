//! # Repository Module
//!
//! Database repository implementations for the credit engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  credit-engine SqliteStore                                             │
//! │       │                                                                 │
//! │       │  db.terms().apply_usage(&next, expected_version, &entry)       │
//! │       ▼                                                                 │
//! │  CreditTermsRepository                                                 │
//! │  ├── get / insert / update (version-checked)                           │
//! │  ├── apply_usage       (terms + new ledger row, one transaction)       │
//! │  └── apply_settlement  (terms + updated ledger row, one transaction)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CreditTermsRepository`](terms::CreditTermsRepository) - Terms and balance-moving transactions
//! - [`LedgerRepository`](ledger::LedgerRepository) - Ledger reads
//! - [`FeatureFlagRepository`](flags::FeatureFlagRepository) - Kill switches
//! - [`BenefitRepository`](benefits::BenefitRepository) - Customer benefits
//! - [`AuditRepository`](audit::AuditRepository) - Audit facts

pub mod audit;
pub mod benefits;
pub mod flags;
pub mod ledger;
pub mod terms;
