//! # Domain Types
//!
//! Core domain types used throughout the credit engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CreditTerms    │   │  LedgerEntry    │   │  FeatureFlag    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  customer_id    │   │  order_id       │   │  feature_key    │       │
//! │  │  limit_cents    │   │  used_cents     │   │  enabled        │       │
//! │  │  balance_cents  │   │  paid_cents     │   │  disabled_*     │       │
//! │  │  status         │   │  due_date       │   └─────────────────┘       │
//! │  │  net_terms      │   │  payment_status │                             │
//! │  │  version        │   └─────────────────┘   ┌─────────────────┐       │
//! │  └─────────────────┘                         │ CustomerBenefit │       │
//! │                                              │  ─────────────  │       │
//! │  ┌─────────────────┐   ┌─────────────────┐   │  benefit_type   │       │
//! │  │ CustomerHistory │   │   AuditFact     │   │  enabled        │       │
//! │  │  lifetime_orders│   │  actor_id       │   └─────────────────┘       │
//! │  │  loyalty_tier   │   │  event_type     │                             │
//! │  │  overdue flag   │   │  severity       │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cents Fields
//! Persisted amounts are stored as `*_cents: i64` columns (same as the
//! database) and exposed as [`Money`] through accessor methods.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;
use crate::SYSTEM_ACTOR_ID;

// =============================================================================
// Actor
// =============================================================================

/// The pre-resolved caller of an engine operation.
///
/// Authentication and role resolution happen outside the engine; the engine
/// only needs the id (for audit) and whether the caller holds the
/// super-privileged capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    pub id: String,
    pub super_privileged: bool,
}

impl Actor {
    pub fn new(id: impl Into<String>, super_privileged: bool) -> Self {
        Actor {
            id: id.into(),
            super_privileged,
        }
    }

    /// A super-privileged actor (credit administrator).
    pub fn admin(id: impl Into<String>) -> Self {
        Actor::new(id, true)
    }

    /// A regular authenticated actor (sales rep, customer portal user).
    pub fn user(id: impl Into<String>) -> Self {
        Actor::new(id, false)
    }

    /// The engine's own pipelines (order placement, payment capture).
    ///
    /// Not super-privileged: the system may use and settle credit but never
    /// grant or change it.
    pub fn system() -> Self {
        Actor::new(SYSTEM_ACTOR_ID, false)
    }
}

// =============================================================================
// Credit Status
// =============================================================================

/// Lifecycle status of a customer's credit terms.
///
/// ## State Machine
/// ```text
///            approve()
///   (none) ───────────► ACTIVE ◄──────────── reactivate()
///                         │  ▲                     │
///             suspend()   │  │ approve()           │
///                         ▼  │                     │
///                     SUSPENDED ───────────────────┘
///                         │
///           deactivate()  ▼
///                     INACTIVE  (from ACTIVE too; re-approve to return)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    /// Credit may be used for new orders.
    #[default]
    Active,
    /// Credit closed; existing obligations still settle.
    Inactive,
    /// Credit frozen by an administrator; existing obligations still settle.
    Suspended,
}

impl CreditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditStatus::Active => "active",
            CreditStatus::Inactive => "inactive",
            CreditStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(CreditStatus::Active),
            "inactive" => Ok(CreditStatus::Inactive),
            "suspended" => Ok(CreditStatus::Suspended),
            other => Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown credit status '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Net Terms
// =============================================================================

/// Payment window granted on credit orders ("net 30" = due in 30 days).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum NetTerms {
    #[serde(rename = "net_7")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "net_7"))]
    Net7,
    #[serde(rename = "net_14")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "net_14"))]
    Net14,
    #[default]
    #[serde(rename = "net_30")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "net_30"))]
    Net30,
    #[serde(rename = "net_45")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "net_45"))]
    Net45,
    #[serde(rename = "net_60")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "net_60"))]
    Net60,
}

impl NetTerms {
    /// Every supported term, shortest first.
    pub const ALL: [NetTerms; 5] = [
        NetTerms::Net7,
        NetTerms::Net14,
        NetTerms::Net30,
        NetTerms::Net45,
        NetTerms::Net60,
    ];

    /// Number of days until a credit order falls due.
    pub const fn days(&self) -> i64 {
        match self {
            NetTerms::Net7 => 7,
            NetTerms::Net14 => 14,
            NetTerms::Net30 => 30,
            NetTerms::Net45 => 45,
            NetTerms::Net60 => 60,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetTerms::Net7 => "net_7",
            NetTerms::Net14 => "net_14",
            NetTerms::Net30 => "net_30",
            NetTerms::Net45 => "net_45",
            NetTerms::Net60 => "net_60",
        }
    }
}

impl fmt::Display for NetTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetTerms {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        NetTerms::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized || t.days().to_string() == normalized)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "net_terms".to_string(),
                reason: format!(
                    "unknown net terms '{}'. Valid options: net_7, net_14, net_30, net_45, net_60",
                    s
                ),
            })
    }
}

// =============================================================================
// Credit Terms
// =============================================================================

/// A customer's credit agreement: limit, running balance and status.
///
/// ## Invariant
/// `0 ≤ current_balance_cents ≤ credit_limit_cents` after every write made
/// through the mutation service. Readers must not assume it and clamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CreditTerms {
    /// Customer this agreement belongs to (owned by the CRM).
    pub customer_id: String,

    /// Ceiling on the outstanding balance, in cents.
    pub credit_limit_cents: i64,

    /// Sum of unpaid credit-order amounts, in cents.
    pub current_balance_cents: i64,

    pub status: CreditStatus,

    pub net_terms: NetTerms,

    /// Set only while suspended.
    pub suspended_reason: Option<String>,

    /// Set only while suspended.
    #[ts(as = "Option<String>")]
    pub suspended_at: Option<DateTime<Utc>>,

    /// Actor who granted (or last re-granted) the terms.
    pub approved_by: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Optimistic concurrency counter, incremented on every write.
    pub version: i64,
}

impl CreditTerms {
    /// Returns the credit limit as Money.
    #[inline]
    pub fn credit_limit(&self) -> Money {
        Money::from_cents(self.credit_limit_cents)
    }

    /// Returns the outstanding balance as Money.
    #[inline]
    pub fn current_balance(&self) -> Money {
        Money::from_cents(self.current_balance_cents)
    }
}

// =============================================================================
// Credit Order
// =============================================================================

/// An order the caller wants to pay with credit.
///
/// Orders are owned by the order service; the engine only reads the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditOrder {
    pub order_id: String,
    pub customer_id: String,
    pub total_cents: i64,
}

impl CreditOrder {
    pub fn new(order_id: impl Into<String>, customer_id: impl Into<String>, total: Money) -> Self {
        CreditOrder {
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            total_cents: total.cents(),
        }
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment progress of a credit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    PartiallyPaid,
    FullyPaid,
    Overpaid,
}

impl PaymentStatus {
    /// Derives the status from what was used and what has been paid.
    pub fn from_amounts(used: Money, paid: Money) -> Self {
        if paid.cents() <= 0 {
            PaymentStatus::Pending
        } else if paid < used {
            PaymentStatus::PartiallyPaid
        } else if paid == used {
            PaymentStatus::FullyPaid
        } else {
            PaymentStatus::Overpaid
        }
    }

    /// True once nothing remains owed on the order.
    pub const fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::FullyPaid | PaymentStatus::Overpaid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::PartiallyPaid => "partially_paid",
            PaymentStatus::FullyPaid => "fully_paid",
            PaymentStatus::Overpaid => "overpaid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// One order's use of credit.
///
/// Uses the snapshot pattern: the due date is frozen at the moment credit
/// was applied and never recalculated, even if the customer's net terms
/// change later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    pub id: String,
    pub order_id: String,
    pub customer_id: String,
    pub credit_amount_used_cents: i64,
    pub amount_paid_cents: i64,
    pub payment_status: PaymentStatus,
    #[ts(as = "String")]
    pub used_at: DateTime<Utc>,
    /// `used_at` + net-terms days at time of use (frozen).
    #[ts(as = "String")]
    pub credit_due_date: DateTime<Utc>,
    /// When the entry became fully paid.
    #[ts(as = "Option<String>")]
    pub settled_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    #[inline]
    pub fn credit_amount_used(&self) -> Money {
        Money::from_cents(self.credit_amount_used_cents)
    }

    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }
}

// =============================================================================
// Feature Flags (Kill Switches)
// =============================================================================

/// The closed set of kill switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    /// Gates credit approval, limit changes and apply-to-order.
    CreditTermsGlobal,
    /// Gates customer benefits.
    BenefitsGlobal,
}

impl FeatureKey {
    pub const ALL: [FeatureKey; 2] = [FeatureKey::CreditTermsGlobal, FeatureKey::BenefitsGlobal];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKey::CreditTermsGlobal => "credit_terms_global",
            FeatureKey::BenefitsGlobal => "benefits_global",
        }
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "feature_key".to_string(),
                reason: format!("unknown feature key '{}'", s),
            })
    }
}

/// A persisted kill-switch record.
///
/// `disabled_by`, `disabled_at` and `disabled_reason` are present only while
/// `enabled = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FeatureFlag {
    pub feature_key: FeatureKey,
    pub enabled: bool,
    pub disabled_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub disabled_at: Option<DateTime<Utc>>,
    pub disabled_reason: Option<String>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl FeatureFlag {
    /// Resolves the effective state of a kill switch.
    ///
    /// ## Fail-Open Default
    /// ```text
    /// record                       │ effective
    /// ─────────────────────────────┼──────────
    /// None (no row for the key)    │ ENABLED
    /// Some { enabled: true }       │ ENABLED
    /// Some { enabled: false }      │ DISABLED
    /// ```
    /// A switch only turns a feature off once someone explicitly flips it.
    pub fn resolve(record: Option<&FeatureFlag>) -> bool {
        record.map_or(true, |flag| flag.enabled)
    }

    /// Builds an explicitly disabled record.
    pub fn disabled(
        key: FeatureKey,
        actor_id: impl Into<String>,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        FeatureFlag {
            feature_key: key,
            enabled: false,
            disabled_by: Some(actor_id.into()),
            disabled_at: Some(now),
            disabled_reason: Some(reason.into()),
            updated_at: now,
        }
    }

    /// Builds an explicitly enabled record (disable metadata cleared).
    pub fn enabled(key: FeatureKey, now: DateTime<Utc>) -> Self {
        FeatureFlag {
            feature_key: key,
            enabled: true,
            disabled_by: None,
            disabled_at: None,
            disabled_reason: None,
            updated_at: now,
        }
    }
}

// =============================================================================
// Customer Benefits
// =============================================================================

/// Non-monetary entitlements consumed by scheduling code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BenefitType {
    PriorityProcessing,
    DedicatedManager,
    FasterSla,
}

impl BenefitType {
    pub const ALL: [BenefitType; 3] = [
        BenefitType::PriorityProcessing,
        BenefitType::DedicatedManager,
        BenefitType::FasterSla,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BenefitType::PriorityProcessing => "priority_processing",
            BenefitType::DedicatedManager => "dedicated_manager",
            BenefitType::FasterSla => "faster_sla",
        }
    }
}

impl fmt::Display for BenefitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BenefitType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BenefitType::ALL
            .iter()
            .copied()
            .find(|b| b.as_str() == s.trim())
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "benefit_type".to_string(),
                reason: format!("unknown benefit type '{}'", s),
            })
    }
}

/// One benefit row (customer × benefit type).
///
/// `enabled` is the only source of truth; the timestamps are an audit trail
/// and are never compared to infer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CustomerBenefit {
    pub customer_id: String,
    pub benefit_type: BenefitType,
    pub enabled: bool,
    #[ts(as = "Option<String>")]
    pub enabled_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub disabled_at: Option<DateTime<Utc>>,
    pub disabled_reason: Option<String>,
    pub updated_by: String,
}

// =============================================================================
// Customer History (eligibility input)
// =============================================================================

/// Loyalty tiers, lowest first. Ordering is meaningful (`Silver < Gold`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl LoyaltyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyTier::Bronze => "bronze",
            LoyaltyTier::Silver => "silver",
            LoyaltyTier::Gold => "gold",
            LoyaltyTier::Platinum => "platinum",
        }
    }
}

impl fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoyaltyTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bronze" => Ok(LoyaltyTier::Bronze),
            "silver" => Ok(LoyaltyTier::Silver),
            "gold" => Ok(LoyaltyTier::Gold),
            "platinum" => Ok(LoyaltyTier::Platinum),
            other => Err(ValidationError::InvalidFormat {
                field: "loyalty_tier".to_string(),
                reason: format!("unknown loyalty tier '{}'", other),
            }),
        }
    }
}

/// What the customer-history provider knows about a customer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerHistory {
    pub lifetime_orders: u32,
    pub loyalty_tier: LoyaltyTier,
    pub has_overdue_invoices: bool,
}

// =============================================================================
// Audit Facts
// =============================================================================

/// How loudly an audit fact should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Every kind of mutation the engine audits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    CreditApproved,
    CreditLimitAdjusted,
    CreditSuspended,
    CreditReactivated,
    CreditDeactivated,
    CreditApplied,
    CreditSettled,
    FeatureFlagToggled,
    BenefitEnabled,
    BenefitDisabled,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::CreditApproved => "credit_approved",
            AuditEventType::CreditLimitAdjusted => "credit_limit_adjusted",
            AuditEventType::CreditSuspended => "credit_suspended",
            AuditEventType::CreditReactivated => "credit_reactivated",
            AuditEventType::CreditDeactivated => "credit_deactivated",
            AuditEventType::CreditApplied => "credit_applied",
            AuditEventType::CreditSettled => "credit_settled",
            AuditEventType::FeatureFlagToggled => "feature_flag_toggled",
            AuditEventType::BenefitEnabled => "benefit_enabled",
            AuditEventType::BenefitDisabled => "benefit_disabled",
        }
    }
}

/// A write-only record of one mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFact {
    pub id: String,
    pub actor_id: String,
    pub event_type: AuditEventType,
    /// Structured payload (amounts in cents, ids, reasons).
    pub event_data: serde_json::Value,
    pub severity: Severity,
    pub occurred_at: DateTime<Utc>,
}

impl AuditFact {
    pub fn new(
        actor_id: impl Into<String>,
        event_type: AuditEventType,
        severity: Severity,
        event_data: serde_json::Value,
    ) -> Self {
        AuditFact {
            id: Uuid::new_v4().to_string(),
            actor_id: actor_id.into(),
            event_type,
            event_data,
            severity,
            occurred_at: Utc::now(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_terms_days() {
        let days: Vec<i64> = NetTerms::ALL.iter().map(|t| t.days()).collect();
        assert_eq!(days, vec![7, 14, 30, 45, 60]);
    }

    #[test]
    fn test_net_terms_parsing() {
        assert_eq!("net_45".parse::<NetTerms>().unwrap(), NetTerms::Net45);
        assert_eq!("30".parse::<NetTerms>().unwrap(), NetTerms::Net30);
        assert!("net_90".parse::<NetTerms>().is_err());
    }

    #[test]
    fn test_net_terms_serde_names() {
        let json = serde_json::to_string(&NetTerms::Net14).unwrap();
        assert_eq!(json, "\"net_14\"");
        let parsed: NetTerms = serde_json::from_str("\"net_60\"").unwrap();
        assert_eq!(parsed, NetTerms::Net60);
    }

    #[test]
    fn test_payment_status_from_amounts() {
        let used = Money::from_major(100);
        assert_eq!(
            PaymentStatus::from_amounts(used, Money::zero()),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentStatus::from_amounts(used, Money::from_major(40)),
            PaymentStatus::PartiallyPaid
        );
        assert_eq!(
            PaymentStatus::from_amounts(used, used),
            PaymentStatus::FullyPaid
        );
        assert_eq!(
            PaymentStatus::from_amounts(used, Money::from_major(101)),
            PaymentStatus::Overpaid
        );
        assert!(PaymentStatus::Overpaid.is_settled());
        assert!(!PaymentStatus::PartiallyPaid.is_settled());
    }

    #[test]
    fn test_feature_flag_resolve_fail_open() {
        let now = Utc::now();
        assert!(FeatureFlag::resolve(None));

        let on = FeatureFlag::enabled(FeatureKey::CreditTermsGlobal, now);
        assert!(FeatureFlag::resolve(Some(&on)));

        let off = FeatureFlag::disabled(FeatureKey::CreditTermsGlobal, "root", "incident", now);
        assert!(!FeatureFlag::resolve(Some(&off)));
        assert_eq!(off.disabled_reason.as_deref(), Some("incident"));
    }

    #[test]
    fn test_loyalty_tier_ordering() {
        assert!(LoyaltyTier::Bronze < LoyaltyTier::Silver);
        assert!(LoyaltyTier::Gold > LoyaltyTier::Silver);
        assert_eq!("Platinum".parse::<LoyaltyTier>().unwrap(), LoyaltyTier::Platinum);
    }

    #[test]
    fn test_system_actor_is_not_privileged() {
        let actor = Actor::system();
        assert_eq!(actor.id, SYSTEM_ACTOR_ID);
        assert!(!actor.super_privileged);
        assert!(Actor::admin("ops-1").super_privileged);
    }

    #[test]
    fn test_enum_string_round_trip() {
        for key in FeatureKey::ALL {
            assert_eq!(key.as_str().parse::<FeatureKey>().unwrap(), key);
        }
        for benefit in BenefitType::ALL {
            assert_eq!(benefit.as_str().parse::<BenefitType>().unwrap(), benefit);
        }
        assert_eq!("SUSPENDED".parse::<CreditStatus>().unwrap(), CreditStatus::Suspended);
    }
}
