//! # Benefit Rules
//!
//! Pure lookups over a customer's benefit rows. The `enabled` column is the
//! only thing consulted; `enabled_at` / `disabled_at` are history.
//!
//! ```text
//! has_benefit(rows, type, global) = global
//!                                   AND rows contains {type, enabled: true}
//!
//! sla_multiplier = has_benefit(faster_sla) ? configured (0.75) : 1.0
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{BenefitType, CustomerBenefit};

/// True when an enabled row exists for exactly `benefit` and the global
/// benefits switch is on. A missing row means disabled.
pub fn has_benefit(rows: &[CustomerBenefit], benefit: BenefitType, global_enabled: bool) -> bool {
    global_enabled
        && rows
            .iter()
            .any(|row| row.benefit_type == benefit && row.enabled)
}

/// SLA multiplier for scheduling: `faster` with `faster_sla`, otherwise 1.0.
pub fn sla_multiplier(rows: &[CustomerBenefit], global_enabled: bool, faster: f64) -> f64 {
    if has_benefit(rows, BenefitType::FasterSla, global_enabled) {
        faster
    } else {
        1.0
    }
}

impl CustomerBenefit {
    /// Next state of a benefit row after a toggle.
    ///
    /// Enabling stamps `enabled_at` and clears the disable reason; disabling
    /// stamps `disabled_at` and records the reason. The other timestamp is
    /// carried over from `prior` untouched.
    pub fn toggled(
        prior: Option<&CustomerBenefit>,
        customer_id: &str,
        benefit_type: BenefitType,
        enabled: bool,
        actor_id: &str,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut row = prior.cloned().unwrap_or_else(|| CustomerBenefit {
            customer_id: customer_id.to_string(),
            benefit_type,
            enabled: false,
            enabled_at: None,
            disabled_at: None,
            disabled_reason: None,
            updated_by: actor_id.to_string(),
        });

        row.enabled = enabled;
        row.updated_by = actor_id.to_string();
        if enabled {
            row.enabled_at = Some(now);
            row.disabled_reason = None;
        } else {
            row.disabled_at = Some(now);
            row.disabled_reason = Some(reason.unwrap_or_default().to_string());
        }
        row
    }
}

/// Every benefit flag for one customer, for scheduling code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BenefitProfile {
    pub customer_id: String,
    pub priority_processing: bool,
    pub dedicated_manager: bool,
    pub faster_sla: bool,
    pub sla_multiplier: f64,
}

impl BenefitProfile {
    pub fn build(
        customer_id: &str,
        rows: &[CustomerBenefit],
        global_enabled: bool,
        faster: f64,
    ) -> Self {
        BenefitProfile {
            customer_id: customer_id.to_string(),
            priority_processing: has_benefit(rows, BenefitType::PriorityProcessing, global_enabled),
            dedicated_manager: has_benefit(rows, BenefitType::DedicatedManager, global_enabled),
            faster_sla: has_benefit(rows, BenefitType::FasterSla, global_enabled),
            sla_multiplier: sla_multiplier(rows, global_enabled, faster),
        }
    }
}
