//! # Seed Data Generator
//!
//! Populates a development database with sample credit accounts.
//!
//! ## Usage
//! ```bash
//! # Seed the database named in credit-engine.toml (or ./credit.db)
//! cargo run -p credit-engine --bin seed
//!
//! # Specify database path
//! cargo run -p credit-engine --bin seed -- --db ./data/credit_dev.db
//!
//! # Use a specific config file
//! cargo run -p credit-engine --bin seed -- --config ./credit-engine.toml
//! ```
//!
//! ## Generated Accounts
//! - A handful of customers with order histories of varying quality
//! - Eligible customers get approved terms; one ineligible customer is
//!   approved with an eligibility override
//! - Sample orders go on credit and a few are (partly) settled
//! - One account ends up suspended

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use credit_core::{
    Actor, BenefitType, CreditError, CreditOrder, CreditStatus, CustomerHistory, LoyaltyTier,
    Money, NetTerms,
};
use credit_engine::{telemetry, ApproveRequest, CreditEngine, EngineConfig, InMemoryHistoryProvider};

/// (customer id, lifetime orders, tier, overdue invoices, limit in dollars, terms)
const CUSTOMERS: &[(&str, u32, LoyaltyTier, bool, i64, NetTerms)] = &[
    ("ACME", 48, LoyaltyTier::Platinum, false, 25_000, NetTerms::Net45),
    ("GLOBEX", 12, LoyaltyTier::Gold, false, 10_000, NetTerms::Net30),
    ("INITECH", 3, LoyaltyTier::Silver, false, 5_000, NetTerms::Net30),
    ("UMBRELLA", 7, LoyaltyTier::Gold, true, 8_000, NetTerms::Net14),
    ("HOOLI", 1, LoyaltyTier::Bronze, false, 1_000, NetTerms::Net7),
];

/// (order id, customer id, total in dollars)
const ORDERS: &[(&str, &str, i64)] = &[
    ("ORD-1001", "ACME", 4_200),
    ("ORD-1002", "ACME", 9_800),
    ("ORD-1003", "GLOBEX", 2_500),
    ("ORD-1004", "GLOBEX", 7_499),
    ("ORD-1005", "INITECH", 5_001),
    ("ORD-1006", "INITECH", 1_750),
    ("ORD-1007", "HOOLI", 900),
];

/// (order id, payment in dollars)
const PAYMENTS: &[(&str, i64)] = &[("ORD-1001", 4_200), ("ORD-1003", 1_000), ("ORD-1007", 950)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Credit Engine Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: from config)");
                println!("  -c, --config <PATH>   Config file path");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    telemetry::init();

    let mut config = EngineConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }

    println!("🌱 Credit Engine Seed Data Generator");
    println!("====================================");
    println!("Database: {}", config.database.path.display());
    println!();

    let history = Arc::new(InMemoryHistoryProvider::new());
    for (customer, orders, tier, overdue, _, _) in CUSTOMERS {
        history
            .set(
                *customer,
                CustomerHistory {
                    lifetime_orders: *orders,
                    loyalty_tier: *tier,
                    has_overdue_invoices: *overdue,
                },
            )
            .await;
    }

    let engine = CreditEngine::open(&config, history).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = engine.service.accounts_with_status(CreditStatus::Active).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} active accounts", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let admin = Actor::admin("seed-admin");
    let system = Actor::system();

    println!();
    println!("Approving credit terms...");
    for (customer, _, _, _, limit, terms) in CUSTOMERS {
        let request = ApproveRequest::new(*customer, Money::from_major(*limit)).net_terms(*terms);
        match engine.service.approve(&request, &admin).await {
            Ok(t) => println!("  ✓ {} approved for {} ({})", customer, t.credit_limit(), t.net_terms),
            Err(CreditError::NotEligible { missing_requirements }) => {
                println!("  ✗ {} not eligible: {}", customer, missing_requirements.join(", "));
                if *customer == "HOOLI" {
                    engine
                        .service
                        .approve(&request.clone().override_eligibility(), &admin)
                        .await?;
                    println!("  ✓ {} approved with override", customer);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!();
    println!("Placing orders on credit...");
    for (order_id, customer, total) in ORDERS {
        let order = CreditOrder::new(*order_id, *customer, Money::from_major(*total));
        match engine.service.apply_to_order(&order, &system).await {
            Ok(entry) => println!(
                "  ✓ {} {} due {}",
                order_id,
                order.total(),
                entry.credit_due_date.format("%Y-%m-%d")
            ),
            Err(e) => println!("  ✗ {} rejected: {}", order_id, e),
        }
    }

    println!();
    println!("Recording payments...");
    for (order_id, amount) in PAYMENTS {
        match engine.service.settle(order_id, Money::from_major(*amount), &system).await {
            Ok(entry) => println!("  ✓ {} now {}", order_id, entry.payment_status),
            Err(e) => println!("  ✗ {} not settled: {}", order_id, e),
        }
    }

    engine
        .service
        .suspend("INITECH", &admin, "payment dispute under review")
        .await?;
    engine
        .benefits
        .enable("ACME", BenefitType::FasterSla, &admin)
        .await?;
    engine
        .benefits
        .enable("ACME", BenefitType::DedicatedManager, &admin)
        .await?;

    println!();
    println!("Credit summaries");
    println!("────────────────────────────────────────────────────────────────");
    for (customer, ..) in CUSTOMERS {
        let Some(summary) = engine.service.credit_summary(customer).await? else {
            println!("  {:<10} no terms", customer);
            continue;
        };
        let ledger = engine.service.ledger_summary(customer).await?;
        println!(
            "  {:<10} {:<9} limit {:>12}  balance {:>12}  available {:>12}  {:>3}%  open {}",
            customer,
            summary.status.as_str(),
            summary.credit_limit.to_string(),
            summary.current_balance.to_string(),
            summary.available_credit.to_string(),
            summary.utilization_percent,
            ledger.total_outstanding,
        );
    }

    let profile = engine.benefits.profile("ACME").await?;
    println!();
    println!(
        "ACME benefits: dedicated manager {}, SLA multiplier {}",
        profile.dedicated_manager, profile.sla_multiplier
    );

    Ok(())
}
