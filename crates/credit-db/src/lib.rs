//! # credit-db: Database Layer for the Credit Engine
//!
//! SQLite persistence for credit terms, the credit ledger, kill switches,
//! customer benefits and audit facts, using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Credit Engine Data Flow                          │
//! │                                                                         │
//! │  CreditService::apply_to_order                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     credit-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  terms.rs     │    │  (embedded)  │  │   │
//! │  │   │               │    │  ledger.rs    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  flags.rs     │    │ 001_credit_  │  │   │
//! │  │   │ WAL mode      │    │  benefits.rs  │    │   schema.sql │  │   │
//! │  │   │               │    │  audit.rs     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (path from EngineConfig)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use credit_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("credit.db")).await?;
//! let terms = db.terms().get("CUST-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::audit::AuditRepository;
pub use repository::benefits::BenefitRepository;
pub use repository::flags::FeatureFlagRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::terms::CreditTermsRepository;
