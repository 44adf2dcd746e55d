//! # Feature Gate
//!
//! Kill switches for whole features. A switch is OFF only when someone has
//! explicitly disabled it; a missing record reads as ON.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  is_enabled(key)     reads, never fails (store error → warn!, ON)       │
//! │  require(key)        reads, store error → CreditError::Storage          │
//! │                      switch OFF → CreditError::FeatureDisabled          │
//! │  set_enabled(...)    super-privileged only, one audit fact per toggle   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutating paths and `can_cover` go through `require`, so a broken flag
//! store blocks new credit instead of silently allowing it.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use credit_core::validation::validate_optional_reason;
use credit_core::{
    Actor, AuditEventType, AuditFact, CreditError, CreditResult, FeatureFlag, FeatureKey, Severity,
};

use crate::audit::{deliver, AuditSink};
use crate::store::FlagStore;

/// Effective state of one switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateState {
    pub key: FeatureKey,
    pub enabled: bool,
    /// `None` when the switch has never been toggled.
    pub record: Option<FeatureFlag>,
}

/// Injectable kill-switch reader and writer.
#[derive(Clone)]
pub struct FeatureGate {
    store: Arc<dyn FlagStore>,
    audit: Arc<dyn AuditSink>,
}

impl FeatureGate {
    pub fn new(store: Arc<dyn FlagStore>, audit: Arc<dyn AuditSink>) -> Self {
        FeatureGate { store, audit }
    }

    /// True unless `key` has an explicit disabled record.
    pub async fn is_enabled(&self, key: FeatureKey) -> bool {
        match self.store.get_flag(key).await {
            Ok(record) => FeatureFlag::resolve(record.as_ref()),
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "Flag lookup failed, treating as enabled");
                true
            }
        }
    }

    /// `Ok(())` when `key` is on.
    pub async fn require(&self, key: FeatureKey) -> CreditResult<()> {
        let record = self.store.get_flag(key).await?;
        if FeatureFlag::resolve(record.as_ref()) {
            Ok(())
        } else {
            Err(CreditError::FeatureDisabled { key })
        }
    }

    /// Turns a switch on or off.
    ///
    /// Disabling records who, when and why (reason defaults to empty);
    /// enabling clears all three. Toggling to the current state still writes
    /// and audits.
    pub async fn set_enabled(
        &self,
        key: FeatureKey,
        enabled: bool,
        actor: &Actor,
        reason: Option<&str>,
    ) -> CreditResult<FeatureFlag> {
        let operation = if enabled { "enable" } else { "disable" };
        if !actor.super_privileged {
            return Err(CreditError::unauthorized(
                &actor.id,
                format!("{} {}", operation, key),
            ));
        }
        validate_optional_reason(reason)?;

        let now = Utc::now();
        let previous = self.store.get_flag(key).await?;
        let record = if enabled {
            FeatureFlag::enabled(key, now)
        } else {
            FeatureFlag::disabled(key, &actor.id, reason.unwrap_or_default(), now)
        };
        self.store.put_flag(&record).await?;

        info!(key = key.as_str(), enabled, actor_id = %actor.id, "Feature switch toggled");

        let fact = AuditFact::new(
            &actor.id,
            AuditEventType::FeatureFlagToggled,
            Severity::High,
            json!({
                "feature_key": key.as_str(),
                "enabled": enabled,
                "previously_enabled": FeatureFlag::resolve(previous.as_ref()),
                "reason": record.disabled_reason,
            }),
        );
        deliver(self.audit.as_ref(), fact).await;

        Ok(record)
    }

    /// Effective state of every known switch, in key order.
    pub async fn snapshot(&self) -> CreditResult<Vec<GateState>> {
        let records = self.store.list_flags().await?;
        Ok(FeatureKey::ALL
            .iter()
            .map(|&key| {
                let record = records.iter().find(|r| r.feature_key == key).cloned();
                GateState {
                    key,
                    enabled: FeatureFlag::resolve(record.as_ref()),
                    record,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::store::InMemoryStore;

    fn gate() -> (FeatureGate, Arc<MemoryAuditSink>) {
        let sink = Arc::new(MemoryAuditSink::new());
        let gate = FeatureGate::new(Arc::new(InMemoryStore::new()), sink.clone());
        (gate, sink)
    }

    #[tokio::test]
    async fn test_missing_record_is_enabled() {
        let (gate, _) = gate();
        assert!(gate.is_enabled(FeatureKey::CreditTermsGlobal).await);
        assert!(gate.require(FeatureKey::BenefitsGlobal).await.is_ok());
    }

    #[tokio::test]
    async fn test_disable_then_enable() {
        let (gate, sink) = gate();
        let admin = Actor::admin("admin-1");

        let record = gate
            .set_enabled(FeatureKey::CreditTermsGlobal, false, &admin, Some("fraud spike"))
            .await
            .unwrap();
        assert_eq!(record.disabled_by.as_deref(), Some("admin-1"));
        assert_eq!(record.disabled_reason.as_deref(), Some("fraud spike"));
        assert!(!gate.is_enabled(FeatureKey::CreditTermsGlobal).await);
        assert_eq!(
            gate.require(FeatureKey::CreditTermsGlobal).await,
            Err(CreditError::FeatureDisabled {
                key: FeatureKey::CreditTermsGlobal
            })
        );
        // Other switches are unaffected.
        assert!(gate.is_enabled(FeatureKey::BenefitsGlobal).await);

        let record = gate
            .set_enabled(FeatureKey::CreditTermsGlobal, true, &admin, None)
            .await
            .unwrap();
        assert!(record.disabled_by.is_none());
        assert!(record.disabled_at.is_none());
        assert!(gate.is_enabled(FeatureKey::CreditTermsGlobal).await);

        assert_eq!(sink.count_of(AuditEventType::FeatureFlagToggled), 2);
        assert!(sink.facts().iter().all(|f| f.severity == Severity::High));
    }

    #[tokio::test]
    async fn test_disable_without_reason_records_empty() {
        let (gate, sink) = gate();
        let record = gate
            .set_enabled(FeatureKey::BenefitsGlobal, false, &Actor::admin("admin-1"), None)
            .await
            .unwrap();
        assert_eq!(record.disabled_reason.as_deref(), Some(""));
        assert_eq!(sink.last().unwrap().event_data["reason"], json!(""));

        gate.set_enabled(FeatureKey::BenefitsGlobal, true, &Actor::admin("admin-1"), None)
            .await
            .unwrap();
        assert!(sink.last().unwrap().event_data["reason"].is_null());
    }

    #[tokio::test]
    async fn test_unprivileged_toggle_rejected() {
        let (gate, sink) = gate();
        let err = gate
            .set_enabled(FeatureKey::CreditTermsGlobal, false, &Actor::user("clerk"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CreditError::Unauthorized { .. }));
        assert!(gate.is_enabled(FeatureKey::CreditTermsGlobal).await);
        assert!(sink.facts().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_lists_every_key() {
        let (gate, _) = gate();
        gate.set_enabled(FeatureKey::BenefitsGlobal, false, &Actor::admin("admin-1"), None)
            .await
            .unwrap();

        let states = gate.snapshot().await.unwrap();
        assert_eq!(states.len(), FeatureKey::ALL.len());
        let credit = states
            .iter()
            .find(|s| s.key == FeatureKey::CreditTermsGlobal)
            .unwrap();
        assert!(credit.enabled);
        assert!(credit.record.is_none());
        let benefits = states
            .iter()
            .find(|s| s.key == FeatureKey::BenefitsGlobal)
            .unwrap();
        assert!(!benefits.enabled);
    }
}
