//! # Inventory Distributor
//!
//! Stocks every branch towards `INVENTORY_TARGET_PER_BRANCH` (rupees, value
//! at cost). The primary branch carries the whole catalog; the others carry
//! 60-80% of it.
//!
//! ## Usage
//! ```bash
//! INVENTORY_TARGET_PER_BRANCH=250000 cargo run -p bazaar-db --bin distribute-inventory
//! ```

use std::env;

use bazaar_db::cli::{init_tracing, print_usage, CliArgs};
use bazaar_db::jobs::distribute_inventory;
use bazaar_db::{AppConfig, Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse(env::args().skip(1))?;
    if args.help {
        print_usage(
            "distribute-inventory",
            "Plans and writes branch stock towards a per-branch value target.",
        );
        return Ok(());
    }

    init_tracing();
    let config = AppConfig::load()?.with_database_path(args.db_path);

    println!("📦 Bazaar Inventory Distributor");
    println!("===============================");
    println!("Database: {}", config.database_path.display());
    println!("Target:   {} per branch", config.inventory_target_per_branch);
    println!();

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    let mut rng = config.rng();
    let result = distribute_inventory(&db, config.inventory_target_per_branch, &mut rng).await;
    db.close().await;
    let summaries = result?;

    println!("{:<8} {:>8} {:>8} {:>10} {:>16}", "Branch", "Stocked", "Skipped", "Units", "Value");
    for s in &summaries {
        println!(
            "{:<8} {:>8} {:>8} {:>10} {:>16}",
            s.branch_code,
            s.products_stocked,
            s.products_skipped,
            s.total_units,
            s.inventory_value.to_string()
        );
    }
    println!();
    println!("✓ Stocked {} branches", summaries.len());

    Ok(())
}
