//! # Seed Data Generator
//!
//! Populates an empty database with branches, categories, products, staff
//! and customers.
//!
//! ## Usage
//! ```bash
//! # Seed ./bazaar_dev.db (or $DATABASE_PATH)
//! cargo run -p bazaar-db --bin seed
//!
//! # Specify database path, reproducible run
//! BAZAAR_SEED=42 cargo run -p bazaar-db --bin seed -- --db ./data/bazaar.db
//! ```
//!
//! A database that already has branches is left alone. Delete the file to
//! regenerate.

use std::env;
use std::time::Instant;

use bazaar_db::cli::{init_tracing, print_usage, CliArgs};
use bazaar_db::jobs::seed_catalog;
use bazaar_db::{AppConfig, Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse(env::args().skip(1))?;
    if args.help {
        print_usage("seed", "Creates branches, catalog, staff and customers.");
        return Ok(());
    }

    init_tracing();
    let config = AppConfig::load()?.with_database_path(args.db_path);

    println!("🌱 Bazaar Seed Data Generator");
    println!("=============================");
    println!("Database:  {}", config.database_path.display());
    println!("Customers: {}", config.seed_customers);
    println!();

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let mut rng = config.rng();
    let start = Instant::now();
    let result = seed_catalog(&db, config.seed_customers, &mut rng).await;
    db.close().await;
    let summary = result?;

    println!();
    if summary.skipped {
        println!("⚠ Database already has branches");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!("✓ Seeded in {:?}", start.elapsed());
    println!("  Branches:   {}", summary.branches);
    println!("  Categories: {}", summary.categories);
    println!("  Products:   {}", summary.products);
    println!("  Users:      {}", summary.users);
    println!("  Customers:  {}", summary.customers);
    println!();
    println!("Next: distribute-inventory");

    Ok(())
}
