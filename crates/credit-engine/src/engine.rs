//! # Engine Wiring
//!
//! Builds the service, gate and registry over one shared set of stores.
//!
//! ```text
//!                 ┌────────────────────────┐
//!                 │      CreditEngine      │
//!                 └───┬────────┬────────┬──┘
//!                     │        │        │
//!          CreditService  FeatureGate  BenefitRegistry
//!                     │        │        │
//!                     ▼        ▼        ▼
//!            CreditStore   FlagStore   BenefitStore   ← one InMemoryStore
//!                                                       or one SqliteStore
//! ```

use std::sync::Arc;

use tracing::info;

use credit_db::{Database, DbResult};

use crate::audit::{AuditSink, SqliteAuditSink};
use crate::benefits::BenefitRegistry;
use crate::config::EngineConfig;
use crate::gate::FeatureGate;
use crate::history::CustomerHistoryProvider;
use crate::service::CreditService;
use crate::store::{BenefitStore, CreditStore, FlagStore, InMemoryStore, SqliteStore};

/// Everything the API layer talks to.
pub struct CreditEngine {
    pub service: CreditService,
    pub gate: FeatureGate,
    pub benefits: BenefitRegistry,
}

impl CreditEngine {
    /// Wires the components over any store that implements all three traits.
    pub fn with_store<S>(
        store: Arc<S>,
        history: Arc<dyn CustomerHistoryProvider>,
        audit: Arc<dyn AuditSink>,
        config: &EngineConfig,
    ) -> Self
    where
        S: CreditStore + FlagStore + BenefitStore + 'static,
    {
        let flags: Arc<dyn FlagStore> = store.clone();
        let gate = FeatureGate::new(flags, audit.clone());

        let benefit_store: Arc<dyn BenefitStore> = store.clone();
        let benefits = BenefitRegistry::new(benefit_store, gate.clone(), audit.clone())
            .with_faster_sla_multiplier(config.benefits.faster_sla_multiplier);

        let credit_store: Arc<dyn CreditStore> = store;
        let service = CreditService::new(
            credit_store,
            gate.clone(),
            history,
            audit,
            config.service_policy(),
        );

        CreditEngine {
            service,
            gate,
            benefits,
        }
    }

    /// In-memory engine (tests, demos).
    pub fn in_memory(
        history: Arc<dyn CustomerHistoryProvider>,
        audit: Arc<dyn AuditSink>,
        config: &EngineConfig,
    ) -> Self {
        Self::with_store(Arc::new(InMemoryStore::new()), history, audit, config)
    }

    /// SQLite-backed engine. Audit facts go to the same database.
    pub fn sqlite(
        db: Database,
        history: Arc<dyn CustomerHistoryProvider>,
        config: &EngineConfig,
    ) -> Self {
        let audit: Arc<dyn AuditSink> = Arc::new(SqliteAuditSink::new(db.audit()));
        Self::with_store(Arc::new(SqliteStore::new(db)), history, audit, config)
    }

    /// Opens the configured database (running migrations) and wires the engine.
    pub async fn open(
        config: &EngineConfig,
        history: Arc<dyn CustomerHistoryProvider>,
    ) -> DbResult<Self> {
        let db = Database::new(config.database.db_config()).await?;
        info!(path = ?config.database.path, "Credit engine database ready");
        Ok(Self::sqlite(db, history, config))
    }
}
