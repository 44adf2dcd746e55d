//! # Audit Sink
//!
//! Every mutation produces exactly one [`AuditFact`]; reads produce none.
//! Delivery happens after the write has committed:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  write OK ──► sink.emit(fact) ──► Ok   → done                          │
//! │                               └─► Err  → warn!(...)  → done            │
//! │                                                                         │
//! │  The mutation result is returned either way.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Implementations
//! - [`MemoryAuditSink`]: keeps facts in a Vec (tests, admin inspection)
//! - [`TracingAuditSink`]: one structured `info!` event per fact
//! - [`SqliteAuditSink`]: appends to the `audit_facts` table

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{info, warn};

use credit_core::{AuditEventType, AuditFact};
use credit_db::AuditRepository;

use crate::error::AuditError;

/// Destination for audit facts.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn emit(&self, fact: &AuditFact) -> Result<(), AuditError>;
}

/// Emits `fact`, logging instead of failing when the sink is down.
pub(crate) async fn deliver(sink: &dyn AuditSink, fact: AuditFact) {
    if let Err(e) = sink.emit(&fact).await {
        warn!(
            fact_id = %fact.id,
            event = fact.event_type.as_str(),
            actor_id = %fact.actor_id,
            error = %e,
            "Audit delivery failed"
        );
    }
}

// =============================================================================
// Memory Sink
// =============================================================================

/// Collects facts in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    facts: Mutex<Vec<AuditFact>>,
    unavailable: AtomicBool,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fact received, oldest first.
    pub fn facts(&self) -> Vec<AuditFact> {
        self.facts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count_of(&self, event_type: AuditEventType) -> usize {
        self.facts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|f| f.event_type == event_type)
            .count()
    }

    pub fn last(&self) -> Option<AuditFact> {
        self.facts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    /// While set, `emit` rejects facts without storing them.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn emit(&self, fact: &AuditFact) -> Result<(), AuditError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuditError::Unavailable("memory sink switched off".to_string()));
        }
        self.facts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(fact.clone());
        Ok(())
    }
}

// =============================================================================
// Tracing Sink
// =============================================================================

/// Writes each fact as a structured log event on the `credit::audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn emit(&self, fact: &AuditFact) -> Result<(), AuditError> {
        info!(
            target: "credit::audit",
            fact_id = %fact.id,
            actor_id = %fact.actor_id,
            event = fact.event_type.as_str(),
            severity = fact.severity.as_str(),
            data = %fact.event_data,
            "Audit fact"
        );
        Ok(())
    }
}

// =============================================================================
// SQLite Sink
// =============================================================================

/// Persists facts through [`AuditRepository`].
#[derive(Debug, Clone)]
pub struct SqliteAuditSink {
    repo: AuditRepository,
}

impl SqliteAuditSink {
    pub fn new(repo: AuditRepository) -> Self {
        SqliteAuditSink { repo }
    }
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
    async fn emit(&self, fact: &AuditFact) -> Result<(), AuditError> {
        self.repo.insert(fact).await?;
        Ok(())
    }
}
