//! # credit-engine: Customer Credit Terms & Ledger Engine
//!
//! Decides whether a business customer may defer payment on an order, tracks
//! the deferred balance against a limit, and exposes kill switches that turn
//! credit (or benefits) off for everyone at once.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRM API layer (outside the engine)                   │
//! │   resolves the Actor, supplies CustomerHistory, forwards orders and     │
//! │   payment captures                                                      │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────▼─────────────────────────────────────────┐
//! │                 ★ credit-engine (THIS CRATE) ★                          │
//! │                                                                         │
//! │  CreditService ──► FeatureGate        BenefitRegistry ──► FeatureGate  │
//! │       │                                     │                           │
//! │       ├── CustomerLocks (per customer)      │                           │
//! │       ├── CustomerHistoryProvider           │                           │
//! │       ▼                                     ▼                           │
//! │  CreditStore / FlagStore / BenefitStore  (InMemoryStore | SqliteStore)  │
//! │       │                                                                 │
//! │       └──► AuditSink (Memory | Tracing | Sqlite)                        │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │
//!               credit-core (rules)   credit-db (SQLite repositories)
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use credit_core::{Actor, CreditOrder, Money};
//! use credit_engine::{
//!     ApproveRequest, CreditEngine, EngineConfig, InMemoryHistoryProvider, MemoryAuditSink,
//! };
//!
//! # async fn run() -> credit_core::CreditResult<()> {
//! let engine = CreditEngine::in_memory(
//!     Arc::new(InMemoryHistoryProvider::new()),
//!     Arc::new(MemoryAuditSink::new()),
//!     &EngineConfig::default(),
//! );
//!
//! let admin = Actor::admin("admin-1");
//! let request = ApproveRequest::new("ACME", Money::from_major(5000)).override_eligibility();
//! engine.service.approve(&request, &admin).await?;
//!
//! let order = CreditOrder::new("ORD-1", "ACME", Money::from_major(1200));
//! let entry = engine.service.apply_to_order(&order, &Actor::system()).await?;
//! println!("due {}", entry.credit_due_date);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod benefits;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod history;
pub mod locks;
pub mod service;
pub mod store;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use audit::{AuditSink, MemoryAuditSink, SqliteAuditSink, TracingAuditSink};
pub use benefits::BenefitRegistry;
pub use config::EngineConfig;
pub use engine::CreditEngine;
pub use error::{AuditError, ConfigError, ConfigResult, StoreError, StoreResult};
pub use gate::{FeatureGate, GateState};
pub use history::{CustomerHistoryProvider, InMemoryHistoryProvider};
pub use locks::CustomerLocks;
pub use service::{ApproveRequest, CreditService, ServicePolicy};
pub use store::{BenefitStore, CreditStore, FlagStore, InMemoryStore, SqliteStore};
