//! # Data Validator
//!
//! Read-only consistency report: sale arithmetic, references, customer
//! aggregates, product pricing and stock sanity.
//!
//! ## Exit Status
//! - `0` no failures (warnings are informational)
//! - `1` at least one failing check, or the run itself failed

use std::env;
use std::process;

use bazaar_db::cli::{init_tracing, print_usage, CliArgs};
use bazaar_db::jobs::validate_data;
use bazaar_db::{AppConfig, Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse(env::args().skip(1))?;
    if args.help {
        print_usage("validate-data", "Checks stored data for consistency. Exits 1 on failures.");
        return Ok(());
    }

    init_tracing();
    let config = AppConfig::load()?.with_database_path(args.db_path);

    println!("🔍 Bazaar Data Validator");
    println!("========================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    let result = validate_data(&db).await;
    db.close().await;
    let report = result?;

    for passed in &report.passed {
        println!("✓ {:<20} {} checked", passed.check.name(), passed.examined);
    }
    println!();
    println!(
        "Passed: {}  Warnings: {}  Failures: {}",
        report.passed_count(),
        report.warning_count(),
        report.failure_count()
    );

    if report.has_failures() {
        println!("✗ Validation failed");
        process::exit(1);
    }
    println!("✓ Validation passed");

    Ok(())
}
