//! Random apply/settle sequences keep the balance within `[0, limit]` and
//! equal to what the ledger says is outstanding.

use std::sync::Arc;

use proptest::prelude::*;

use credit_core::{Actor, CreditError, CreditOrder, Money};
use credit_engine::{
    ApproveRequest, CreditEngine, EngineConfig, InMemoryHistoryProvider, MemoryAuditSink,
};

#[derive(Debug, Clone)]
enum Op {
    Apply(i64),
    Settle(usize, i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1i64..=400_000).prop_map(Op::Apply),
        (0usize..20, 1i64..=300_000).prop_map(|(i, c)| Op::Settle(i, c)),
    ]
}

fn run(limit_cents: i64, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| TestCaseError::fail(e.to_string()))?;

    rt.block_on(async move {
        let engine = CreditEngine::in_memory(
            Arc::new(InMemoryHistoryProvider::new()),
            Arc::new(MemoryAuditSink::new()),
            &EngineConfig::default(),
        );
        let service = &engine.service;
        service
            .approve(
                &ApproveRequest::new("CUST-1", Money::from_cents(limit_cents)).override_eligibility(),
                &Actor::admin("admin-1"),
            )
            .await
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let mut orders: Vec<String> = Vec::new();
        for (n, op) in ops.into_iter().enumerate() {
            match op {
                Op::Apply(cents) => {
                    let order_id = format!("ORD-{n}");
                    let order = CreditOrder::new(&order_id, "CUST-1", Money::from_cents(cents));
                    match service.apply_to_order(&order, &Actor::system()).await {
                        Ok(_) => orders.push(order_id),
                        Err(CreditError::InsufficientCredit { .. })
                        | Err(CreditError::CreditNotUsable { .. }) => {}
                        Err(e) => return Err(TestCaseError::fail(e.to_string())),
                    }
                }
                Op::Settle(i, cents) => {
                    if orders.is_empty() {
                        continue;
                    }
                    let order_id = &orders[i % orders.len()];
                    service
                        .settle(order_id, Money::from_cents(cents), &Actor::system())
                        .await
                        .map_err(|e| TestCaseError::fail(e.to_string()))?;
                }
            }

            let terms = service
                .terms("CUST-1")
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?
                .ok_or_else(|| TestCaseError::fail("terms vanished"))?;
            prop_assert!(terms.current_balance() >= Money::zero());
            prop_assert!(terms.current_balance() <= terms.credit_limit());

            let summary = service
                .ledger_summary("CUST-1")
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(summary.total_outstanding, terms.current_balance());
        }
        Ok(())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_balance_stays_in_bounds(
        limit in 0i64..=1_000_000,
        ops in prop::collection::vec(op(), 1..40),
    ) {
        run(limit, ops)?;
    }
}
