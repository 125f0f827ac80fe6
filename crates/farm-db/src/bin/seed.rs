//! # Seed Tool
//!
//! Writes the default dataset into a database file if it has no details.
//!
//! ## Usage
//! ```bash
//! # Seed ./farm_dev.db (default)
//! cargo run -p farm-db --bin seed
//!
//! # Specify database path
//! cargo run -p farm-db --bin seed -- --db ./data/farm.db
//! ```
//!
//! Prints a JSON summary of the store afterwards.

use std::env;

use farm_db::migrations::migration_status;
use farm_db::{Database, DbConfig};
use serde::Serialize;

/// What the store holds after seeding.
#[derive(Debug, Serialize)]
struct SeedSummary {
    database: String,
    seeded: bool,
    migrations_applied: usize,
    details: i64,
    allocations: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./farm_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Print Farm Seed Tool");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./farm_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let seeded = db.seed_if_empty().await?;
    let (_, migrations_applied) = migration_status(db.pool()).await?;
    let (details, allocations) = db.counts().await?;

    if !seeded {
        eprintln!("Store already has details, nothing written.");
    }

    let summary = SeedSummary {
        database: db_path,
        seeded,
        migrations_applied,
        details,
        allocations,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    db.close().await;
    Ok(())
}
