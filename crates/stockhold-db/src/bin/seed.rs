//! # Seed Data Generator
//!
//! Populates the database with demo deposits and branch stock for
//! development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 deposits (default)
//! cargo run -p stockhold-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p stockhold-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p stockhold-db --bin seed -- --db ./data/stockhold.db
//! ```
//!
//! ## Generated Data
//! For each deposit:
//! - One confirmed deposit receipt `DR-{branch}-{index}` for a phone model
//! - A matching stock record in the same branch (mostly verified and in
//!   stock, some out of stock or unverified to exercise rejections)
//!
//! Deposits rotate across branches and deposit types.

use chrono::Utc;
use std::env;
use stockhold_core::{
    DepositAmounts, DepositCustomer, DepositProduct, DepositReceipt, DepositStatus, DepositType,
    InventoryUnit, Money, Salesperson, StockTracking,
};
use stockhold_db::{Database, DbConfig};
use uuid::Uuid;

/// Branches the demo data is spread over
const BRANCHES: &[&str] = &["BKK01", "BKK02", "CNX01", "HKT01"];

/// Phone models with their price in baht
const MODELS: &[(&str, i64)] = &[
    ("Galaxy S25 256GB", 32_900),
    ("Galaxy A56 128GB", 14_999),
    ("iPhone 16 128GB", 29_900),
    ("iPhone 16 Pro 256GB", 43_900),
    ("Redmi Note 14 Pro", 10_990),
    ("OPPO Reno13 5G", 15_990),
    ("vivo V50", 16_999),
    ("Pixel 9a", 17_990),
];

/// Customers for realistic receipts
const CUSTOMERS: &[(&str, &str)] = &[
    ("Somchai Jaidee", "0812345678"),
    ("Suda Rakthai", "0898765432"),
    ("Anan Wongsa", "0861122334"),
    ("Malee Srisuk", "0923344556"),
    ("Prasert Chaiyo", "0957788990"),
];

/// Sales staff as (employee id, display name)
const SALESPEOPLE: &[(&str, &str)] = &[("emp-1", "Nok"), ("emp-2", "Ploy"), ("emp-3", "Beam")];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./stockhold_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockhold Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of deposits to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./stockhold_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockhold Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Deposits: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.deposits().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} deposits", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating deposits and stock...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let (deposit, unit) = generate_pair(seed);

        if let Err(e) = db.inventory().upsert(&unit).await {
            eprintln!("Failed to insert stock {}: {}", unit.imei, e);
            continue;
        }
        if let Err(e) = db.deposits().insert(&deposit).await {
            eprintln!("Failed to insert {}: {}", deposit.receipt_number, e);
            continue;
        }

        generated += 1;
        if generated % 25 == 0 {
            println!("  Generated {} deposits...", generated);
        }
    }

    println!();
    println!("✓ Generated {} deposits in {:?}", generated, start.elapsed());
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates one deposit and the stock record it points at.
fn generate_pair(seed: usize) -> (DepositReceipt, InventoryUnit) {
    let now = Utc::now();

    let branch_code = BRANCHES[seed % BRANCHES.len()];
    let (model, price_baht) = MODELS[seed % MODELS.len()];
    let (customer_name, phone) = CUSTOMERS[seed % CUSTOMERS.len()];
    let (emp_id, emp_name) = SALESPEOPLE[seed % SALESPEOPLE.len()];

    // 15-digit IMEI-shaped serial (checksum not valid)
    let imei = format!("35{:013}", 4_000_000_000 + seed as u64 * 7_919);

    // Deposit is 10-30% of price, rounded to 100 baht
    let deposit_pct = 10 + (seed % 3) as i64 * 10;
    let deposit_baht = price_baht * deposit_pct / 100 / 100 * 100;
    let total = Money::from_baht(price_baht);
    let deposit_amount = Money::from_baht(deposit_baht);

    let deposit_type = if seed % 4 == 0 {
        DepositType::Preorder
    } else {
        DepositType::Online
    };

    let deposit = DepositReceipt {
        id: Uuid::new_v4().to_string(),
        receipt_number: format!("DR-{}-{:05}", branch_code, seed + 1),
        deposit_type,
        status: DepositStatus::Confirmed,
        branch_code: branch_code.to_string(),
        product: DepositProduct {
            id: format!("prod-{:03}", seed % MODELS.len()),
            name: model.to_string(),
            imei: Some(imei.clone()),
        },
        customer: DepositCustomer {
            name: customer_name.to_string(),
            phone: Some(phone.to_string()),
        },
        amounts: DepositAmounts {
            deposit_amount,
            total_amount: total,
            remaining_amount: total - deposit_amount,
        },
        salesperson: Salesperson {
            id: Some(emp_id.to_string()),
            name: emp_name.to_string(),
        },
        tracking: StockTracking::default(),
        completed_at: None,
        created_at: now,
    };

    // Every 10th unit is out of stock, every 7th is not yet verified
    let unit = InventoryUnit {
        id: Uuid::new_v4().to_string(),
        branch_code: branch_code.to_string(),
        imei,
        name: model.to_string(),
        stock_value: if seed % 10 == 9 { 0 } else { 1 },
        verified: seed % 7 != 6,
        updated_at: now,
    };

    (deposit, unit)
}
