//! End-to-end credit scenarios against the in-memory engine.

use std::sync::Arc;

use chrono::{Duration, Utc};

use credit_core::{
    evaluate, Actor, AuditEventType, BenefitType, CreditError, CreditOrder, CreditStatus,
    CustomerHistory, FeatureFlag, FeatureKey, LoyaltyTier, Money, NetTerms,
};
use credit_engine::{
    ApproveRequest, CreditEngine, EngineConfig, InMemoryHistoryProvider, MemoryAuditSink,
};

struct Harness {
    engine: CreditEngine,
    history: Arc<InMemoryHistoryProvider>,
    audit: Arc<MemoryAuditSink>,
}

fn harness() -> Harness {
    let history = Arc::new(InMemoryHistoryProvider::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let engine = CreditEngine::in_memory(history.clone(), audit.clone(), &EngineConfig::default());
    Harness {
        engine,
        history,
        audit,
    }
}

fn admin() -> Actor {
    Actor::admin("admin-1")
}

async fn open_account(h: &Harness, customer: &str, limit: i64) {
    h.history
        .set(
            customer,
            CustomerHistory {
                lifetime_orders: 10,
                loyalty_tier: LoyaltyTier::Gold,
                has_overdue_invoices: false,
            },
        )
        .await;
    h.engine
        .service
        .approve(&ApproveRequest::new(customer, Money::from_major(limit)), &admin())
        .await
        .unwrap();
}

async fn apply(h: &Harness, order: &str, customer: &str, dollars: i64) -> Result<(), CreditError> {
    h.engine
        .service
        .apply_to_order(
            &CreditOrder::new(order, customer, Money::from_major(dollars)),
            &Actor::system(),
        )
        .await
        .map(|_| ())
}

#[tokio::test]
async fn test_apply_exactly_the_limit() {
    let h = harness();
    open_account(&h, "CUST-1", 5000).await;

    apply(&h, "ORD-1", "CUST-1", 5000).await.unwrap();

    let summary = h.engine.service.credit_summary("CUST-1").await.unwrap().unwrap();
    assert_eq!(summary.current_balance, Money::from_major(5000));
    assert_eq!(summary.available_credit, Money::zero());
    assert_eq!(summary.utilization_percent, 100);
}

#[tokio::test]
async fn test_apply_one_over_the_limit() {
    let h = harness();
    open_account(&h, "CUST-1", 5000).await;

    let err = apply(&h, "ORD-1", "CUST-1", 5001).await.unwrap_err();
    assert_eq!(
        err,
        CreditError::InsufficientCredit {
            requested: Money::from_major(5001),
            available: Money::from_major(5000),
            shortfall: Money::from_major(1),
        }
    );

    let terms = h.engine.service.terms("CUST-1").await.unwrap().unwrap();
    assert_eq!(terms.current_balance(), Money::zero());
    assert!(h.engine.service.ledger("CUST-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_can_cover_at_the_edge() {
    let h = harness();
    open_account(&h, "CUST-1", 5000).await;
    apply(&h, "ORD-1", "CUST-1", 4000).await.unwrap();

    let service = &h.engine.service;
    assert!(service.can_cover("CUST-1", Money::from_major(1000)).await.unwrap());
    assert!(!service.can_cover("CUST-1", Money::from_major(1001)).await.unwrap());
    assert_eq!(
        service.credit_summary("CUST-1").await.unwrap().unwrap().utilization_percent,
        80
    );
}

#[tokio::test]
async fn test_suspended_account_cannot_cover_anything() {
    let h = harness();
    open_account(&h, "CUST-1", 10_000).await;
    h.engine
        .service
        .suspend("CUST-1", &admin(), "manual review")
        .await
        .unwrap();

    assert!(!h
        .engine
        .service
        .can_cover("CUST-1", Money::from_major(1))
        .await
        .unwrap());

    let err = apply(&h, "ORD-1", "CUST-1", 1).await.unwrap_err();
    assert!(matches!(err, CreditError::CreditNotUsable { .. }));
}

#[tokio::test]
async fn test_one_order_short_of_eligibility() {
    let h = harness();
    let history = CustomerHistory {
        lifetime_orders: 1,
        loyalty_tier: LoyaltyTier::Silver,
        has_overdue_invoices: false,
    };
    let result = evaluate(&history);
    assert!(!result.eligible);
    assert_eq!(result.missing_requirements, vec!["need 2+ orders"]);

    h.history.set("CUST-1", history).await;
    let shown = h.engine.service.eligibility("CUST-1").await.unwrap();
    assert_eq!(shown, result);

    let err = h
        .engine
        .service
        .approve(&ApproveRequest::new("CUST-1", Money::from_major(100)), &admin())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CreditError::NotEligible {
            missing_requirements: vec!["need 2+ orders".to_string()]
        }
    );
}

#[tokio::test]
async fn test_kill_switch_fail_open_then_explicit_off() {
    let h = harness();
    assert!(FeatureFlag::resolve(None));
    assert!(h.engine.gate.is_enabled(FeatureKey::CreditTermsGlobal).await);

    open_account(&h, "CUST-1", 1000).await;
    h.engine
        .gate
        .set_enabled(FeatureKey::CreditTermsGlobal, false, &admin(), Some("incident"))
        .await
        .unwrap();

    assert!(!h.engine.gate.is_enabled(FeatureKey::CreditTermsGlobal).await);
    let err = apply(&h, "ORD-1", "CUST-1", 10).await.unwrap_err();
    assert_eq!(
        err,
        CreditError::FeatureDisabled {
            key: FeatureKey::CreditTermsGlobal
        }
    );

    // Suspension is not gated; operators can still act during an incident.
    h.engine
        .service
        .suspend("CUST-1", &admin(), "incident follow-up")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_faster_sla_multiplier() {
    let h = harness();
    let benefits = &h.engine.benefits;
    assert_eq!(benefits.sla_multiplier("CUST-1").await, 1.0);

    benefits
        .enable("CUST-1", BenefitType::PriorityProcessing, &admin())
        .await
        .unwrap();
    assert_eq!(benefits.sla_multiplier("CUST-1").await, 1.0);

    benefits
        .enable("CUST-1", BenefitType::FasterSla, &admin())
        .await
        .unwrap();
    assert_eq!(benefits.sla_multiplier("CUST-1").await, 0.75);

    benefits
        .disable("CUST-1", BenefitType::FasterSla, &admin(), None)
        .await
        .unwrap();
    assert_eq!(benefits.sla_multiplier("CUST-1").await, 1.0);
}

#[tokio::test]
async fn test_suspend_twice_same_state_two_facts() {
    let h = harness();
    open_account(&h, "CUST-1", 5000).await;

    let first = h
        .engine
        .service
        .suspend("CUST-1", &admin(), "first reason")
        .await
        .unwrap();
    let second = h
        .engine
        .service
        .suspend("CUST-1", &admin(), "second reason")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(second.suspended_reason.as_deref(), Some("first reason"));
    assert_eq!(h.audit.count_of(AuditEventType::CreditSuspended), 2);
}

#[tokio::test]
async fn test_suspend_reactivate_round_trip() {
    let h = harness();
    open_account(&h, "CUST-1", 5000).await;
    apply(&h, "ORD-1", "CUST-1", 750).await.unwrap();

    let before = h.engine.service.terms("CUST-1").await.unwrap().unwrap();
    h.engine
        .service
        .suspend("CUST-1", &admin(), "review")
        .await
        .unwrap();
    let after = h.engine.service.reactivate("CUST-1", &admin()).await.unwrap();

    assert_eq!(after.status, CreditStatus::Active);
    assert_eq!(after.current_balance(), before.current_balance());
    assert_eq!(after.credit_limit(), before.credit_limit());
    assert!(after.version > before.version);
}

#[tokio::test]
async fn test_every_mutation_audits_once() {
    let h = harness();
    open_account(&h, "CUST-1", 5000).await;
    apply(&h, "ORD-1", "CUST-1", 100).await.unwrap();
    h.engine
        .service
        .settle("ORD-1", Money::from_major(100), &Actor::system())
        .await
        .unwrap();
    h.engine
        .service
        .adjust_limit("CUST-1", Money::from_major(6000), &admin(), Some("growth"))
        .await
        .unwrap();

    assert_eq!(h.audit.count_of(AuditEventType::CreditApproved), 1);
    assert_eq!(h.audit.count_of(AuditEventType::CreditApplied), 1);
    assert_eq!(h.audit.count_of(AuditEventType::CreditSettled), 1);
    assert_eq!(h.audit.count_of(AuditEventType::CreditLimitAdjusted), 1);
    assert_eq!(h.audit.facts().len(), 4);

    // Rejected mutations write nothing and audit nothing.
    apply(&h, "ORD-2", "CUST-1", 7000).await.unwrap_err();
    assert_eq!(h.audit.facts().len(), 4);
}

#[tokio::test]
async fn test_ledger_overdue_and_next_due() {
    let h = harness();
    h.history
        .set(
            "CUST-1",
            CustomerHistory {
                lifetime_orders: 4,
                loyalty_tier: LoyaltyTier::Silver,
                has_overdue_invoices: false,
            },
        )
        .await;
    h.engine
        .service
        .approve(
            &ApproveRequest::new("CUST-1", Money::from_major(5000)).net_terms(NetTerms::Net7),
            &admin(),
        )
        .await
        .unwrap();
    apply(&h, "ORD-1", "CUST-1", 300).await.unwrap();
    apply(&h, "ORD-2", "CUST-1", 200).await.unwrap();
    h.engine
        .service
        .settle("ORD-2", Money::from_major(50), &Actor::system())
        .await
        .unwrap();

    let now = Utc::now();
    let summary = h.engine.service.ledger_summary_at("CUST-1", now).await.unwrap();
    assert_eq!(summary.entry_count, 2);
    assert_eq!(summary.total_outstanding, Money::from_major(450));
    assert_eq!(summary.overdue_count, 0);
    assert_eq!(summary.next_due.unwrap().order_id, "ORD-1");

    let later = now + Duration::days(10);
    let summary = h.engine.service.ledger_summary_at("CUST-1", later).await.unwrap();
    assert_eq!(summary.overdue_count, 2);
    assert_eq!(summary.overdue_amount, Money::from_major(450));
    assert!(summary.next_due.is_none());

    let notices = h.engine.service.overdue_notices_at("CUST-1", later).await.unwrap();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.days_overdue >= 2));
    assert_eq!(notices[1].amount_outstanding, Money::from_major(150));
}
