//! # Engine Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CREDIT_DB_PATH=/var/lib/credit/credit.db                           │
//! │     CREDIT_MIN_LIFETIME_ORDERS=3                                       │
//! │     CREDIT_MIN_LOYALTY_TIER=gold                                       │
//! │     CREDIT_FASTER_SLA_MULTIPLIER=0.5                                   │
//! │     CREDIT_MAX_LIMIT_CENTS=50000000                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/credit-engine/credit-engine.toml (Linux)                 │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "credit.db"
//! max_connections = 5
//!
//! [eligibility]
//! min_lifetime_orders = 2
//! min_loyalty_tier = "silver"
//!
//! [credit]
//! max_credit_limit_cents = 1000000000
//! default_net_terms = "net_30"
//!
//! [benefits]
//! faster_sla_multiplier = 0.75
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use credit_core::{
    EligibilityPolicy, LoyaltyTier, NetTerms, DEFAULT_FASTER_SLA_MULTIPLIER,
    MAX_CREDIT_LIMIT_CENTS,
};
use credit_db::DbConfig;

use crate::error::{ConfigError, ConfigResult};
use crate::service::ServicePolicy;

const CONFIG_FILE_NAME: &str = "credit-engine.toml";

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path, or ":memory:".
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("credit.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseSettings {
    pub fn db_config(&self) -> DbConfig {
        if self.path.as_os_str() == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.path).max_connections(self.max_connections)
        }
    }
}

// =============================================================================
// Eligibility Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilitySettings {
    #[serde(default = "default_min_lifetime_orders")]
    pub min_lifetime_orders: u32,

    #[serde(default = "default_min_loyalty_tier")]
    pub min_loyalty_tier: LoyaltyTier,
}

fn default_min_lifetime_orders() -> u32 {
    EligibilityPolicy::default().min_lifetime_orders
}

fn default_min_loyalty_tier() -> LoyaltyTier {
    EligibilityPolicy::default().min_loyalty_tier
}

impl Default for EligibilitySettings {
    fn default() -> Self {
        EligibilitySettings {
            min_lifetime_orders: default_min_lifetime_orders(),
            min_loyalty_tier: default_min_loyalty_tier(),
        }
    }
}

impl EligibilitySettings {
    pub fn policy(&self) -> EligibilityPolicy {
        EligibilityPolicy {
            min_lifetime_orders: self.min_lifetime_orders,
            min_loyalty_tier: self.min_loyalty_tier,
        }
    }
}

// =============================================================================
// Credit Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditSettings {
    /// Upper bound for any approved or adjusted limit.
    #[serde(default = "default_max_credit_limit")]
    pub max_credit_limit_cents: i64,

    /// Terms used when an approval does not name any.
    #[serde(default)]
    pub default_net_terms: NetTerms,
}

fn default_max_credit_limit() -> i64 {
    MAX_CREDIT_LIMIT_CENTS
}

impl Default for CreditSettings {
    fn default() -> Self {
        CreditSettings {
            max_credit_limit_cents: default_max_credit_limit(),
            default_net_terms: NetTerms::default(),
        }
    }
}

// =============================================================================
// Benefit Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitSettings {
    /// SLA multiplier granted by `faster_sla`, in (0, 1].
    #[serde(default = "default_faster_sla_multiplier")]
    pub faster_sla_multiplier: f64,
}

fn default_faster_sla_multiplier() -> f64 {
    DEFAULT_FASTER_SLA_MULTIPLIER
}

impl Default for BenefitSettings {
    fn default() -> Self {
        BenefitSettings {
            faster_sla_multiplier: default_faster_sla_multiplier(),
        }
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub eligibility: EligibilitySettings,

    #[serde(default)]
    pub credit: CreditSettings,

    #[serde(default)]
    pub benefits: BenefitSettings,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (credit-engine.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine config from file");
                let contents = std::fs::read_to_string(&path).map_err(|source| {
                    ConfigError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load engine config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.clone(),
                source,
            })?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;

        info!(?path, "Engine config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if !(1..=MAX_CREDIT_LIMIT_CENTS).contains(&self.credit.max_credit_limit_cents) {
            return Err(ConfigError::Invalid(format!(
                "credit.max_credit_limit_cents must be between 1 and {}",
                MAX_CREDIT_LIMIT_CENTS
            )));
        }

        let multiplier = self.benefits.faster_sla_multiplier;
        if !(multiplier > 0.0 && multiplier <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "benefits.faster_sla_multiplier must be in (0, 1], got {}",
                multiplier
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("CREDIT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(orders) = std::env::var("CREDIT_MIN_LIFETIME_ORDERS") {
            match orders.parse::<u32>() {
                Ok(n) => self.eligibility.min_lifetime_orders = n,
                Err(_) => warn!(value = %orders, "Invalid CREDIT_MIN_LIFETIME_ORDERS"),
            }
        }

        if let Ok(tier) = std::env::var("CREDIT_MIN_LOYALTY_TIER") {
            match tier.parse::<LoyaltyTier>() {
                Ok(t) => self.eligibility.min_loyalty_tier = t,
                Err(_) => warn!(value = %tier, "Unknown loyalty tier in environment"),
            }
        }

        if let Ok(multiplier) = std::env::var("CREDIT_FASTER_SLA_MULTIPLIER") {
            match multiplier.parse::<f64>() {
                Ok(m) => self.benefits.faster_sla_multiplier = m,
                Err(_) => warn!(value = %multiplier, "Invalid CREDIT_FASTER_SLA_MULTIPLIER"),
            }
        }

        if let Ok(max) = std::env::var("CREDIT_MAX_LIMIT_CENTS") {
            match max.parse::<i64>() {
                Ok(cents) => self.credit.max_credit_limit_cents = cents,
                Err(_) => warn!(value = %max, "Invalid CREDIT_MAX_LIMIT_CENTS"),
            }
        }
    }

    /// Default config file location for this platform.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "credit", "credit-engine")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Rules the mutation service enforces.
    pub fn service_policy(&self) -> ServicePolicy {
        ServicePolicy {
            eligibility: self.eligibility.policy(),
            max_credit_limit_cents: self.credit.max_credit_limit_cents,
            default_net_terms: self.credit.default_net_terms,
        }
    }
}
