//! # Feature Flag Repository
//!
//! Persistence for kill switches. A missing row means the feature is
//! enabled; see `FeatureFlag::resolve`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use credit_core::{FeatureFlag, FeatureKey};

/// Repository for feature flags.
#[derive(Debug, Clone)]
pub struct FeatureFlagRepository {
    pool: SqlitePool,
}

impl FeatureFlagRepository {
    /// Creates a new FeatureFlagRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FeatureFlagRepository { pool }
    }

    /// Gets the stored record for a key, if any.
    pub async fn get(&self, key: FeatureKey) -> DbResult<Option<FeatureFlag>> {
        let flag = sqlx::query_as::<_, FeatureFlag>(
            r#"
            SELECT feature_key, enabled, disabled_by, disabled_at, disabled_reason, updated_at
            FROM feature_flags
            WHERE feature_key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(flag)
    }

    /// Lists every stored record.
    pub async fn list(&self) -> DbResult<Vec<FeatureFlag>> {
        let flags = sqlx::query_as::<_, FeatureFlag>(
            r#"
            SELECT feature_key, enabled, disabled_by, disabled_at, disabled_reason, updated_at
            FROM feature_flags
            ORDER BY feature_key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(flags)
    }

    /// Inserts or replaces the record for `flag.feature_key`.
    pub async fn upsert(&self, flag: &FeatureFlag) -> DbResult<()> {
        debug!(key = %flag.feature_key, enabled = flag.enabled, "Upserting feature flag");

        sqlx::query(
            r#"
            INSERT INTO feature_flags (
                feature_key, enabled, disabled_by, disabled_at, disabled_reason, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(feature_key) DO UPDATE SET
                enabled = excluded.enabled,
                disabled_by = excluded.disabled_by,
                disabled_at = excluded.disabled_at,
                disabled_reason = excluded.disabled_reason,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(flag.feature_key)
        .bind(flag.enabled)
        .bind(&flag.disabled_by)
        .bind(flag.disabled_at)
        .bind(&flag.disabled_reason)
        .bind(flag.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use chrono::Utc;
    use credit_core::{FeatureFlag, FeatureKey};

    #[tokio::test]
    async fn test_disable_then_enable_clears_metadata() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.flags();

        assert!(repo.get(FeatureKey::CreditTermsGlobal).await.unwrap().is_none());

        let off = FeatureFlag::disabled(FeatureKey::CreditTermsGlobal, "root", "fraud spike", Utc::now());
        repo.upsert(&off).await.unwrap();
        let stored = repo.get(FeatureKey::CreditTermsGlobal).await.unwrap().unwrap();
        assert!(!stored.enabled);
        assert_eq!(stored.disabled_by.as_deref(), Some("root"));
        assert_eq!(stored.disabled_reason.as_deref(), Some("fraud spike"));

        repo.upsert(&FeatureFlag::enabled(FeatureKey::CreditTermsGlobal, Utc::now()))
            .await
            .unwrap();
        let stored = repo.get(FeatureKey::CreditTermsGlobal).await.unwrap().unwrap();
        assert!(stored.enabled);
        assert!(stored.disabled_by.is_none());
        assert!(stored.disabled_at.is_none());

        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
