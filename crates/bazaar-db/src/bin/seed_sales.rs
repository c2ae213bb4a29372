//! # Sales History Generator
//!
//! Generates `SALES_DAYS` days of sales for every branch, ending yesterday.
//! Each sale is stored in its own transaction together with its stock
//! decrement and the customer's stats update.
//!
//! ## Usage
//! ```bash
//! SALES_DAYS=7 SALES_PER_BRANCH_PER_DAY=40 cargo run -p bazaar-db --bin seed-sales
//! ```

use std::env;
use std::time::Instant;

use bazaar_db::cli::{init_tracing, print_usage, CliArgs};
use bazaar_db::jobs::{seed_sales, SalesOptions};
use bazaar_db::{AppConfig, Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse(env::args().skip(1))?;
    if args.help {
        print_usage("seed-sales", "Generates sales history from current branch stock.");
        return Ok(());
    }

    init_tracing();
    let config = AppConfig::load()?.with_database_path(args.db_path);
    let options = SalesOptions::from_config(&config);

    println!("🧾 Bazaar Sales Generator");
    println!("=========================");
    println!("Database:   {}", config.database_path.display());
    println!("Days:       {}", options.days);
    println!("Per branch: {} per day", options.per_branch_per_day);
    println!();

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    let mut rng = config.rng();
    let start = Instant::now();
    let result = seed_sales(&db, &options, &mut rng).await;
    db.close().await;
    let summary = result?;

    let elapsed = start.elapsed();
    println!("✓ Stored {} of {} sales in {:?}", summary.inserted, summary.attempted, elapsed);
    if summary.inserted > 0 {
        println!(
            "  Rate: {:.0} sales/second",
            summary.inserted as f64 / elapsed.as_secs_f64()
        );
    }
    if let (Some(first), Some(last)) = (&summary.first_number, &summary.last_number) {
        println!("  Numbers: {first} .. {last}");
    }
    if summary.skipped_empty > 0 {
        println!("⚠ {} slots skipped: branch out of stock", summary.skipped_empty);
    }
    if summary.failed > 0 {
        println!("⚠ {} sales rejected (see log)", summary.failed);
    }

    Ok(())
}
