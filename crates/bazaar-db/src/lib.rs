//! # bazaar-db: Database Layer and Batch Jobs for Bazaar
//!
//! SQLite storage for branches, catalog, staff, customers and sales, plus
//! the batch jobs that seed, stock, sell and validate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Data Flow                                 │
//! │                                                                         │
//! │  bin/seed · bin/distribute_inventory · bin/seed_sales · bin/validate    │
//! │       │  (cli.rs + config.rs)                                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bazaar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │   │
//! │  │   │     jobs      │───►│  Repositories │───►│   Database   │    │   │
//! │  │   │               │    │               │    │   (pool.rs)  │    │   │
//! │  │   │ seed_catalog  │    │ SaleRepo      │    │              │    │   │
//! │  │   │ distribute    │    │ ProductRepo   │    │ SqlitePool   │    │   │
//! │  │   │ seed_sales    │    │ CustomerRepo  │    │ Migrations   │    │   │
//! │  │   │ validate_data │    │ ...           │    │ (embedded)   │    │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘    │   │
//! │  │           │ pure logic                                          │   │
//! │  │           ▼                                                     │   │
//! │  │      bazaar-core (SaleBuilder, InventoryDistributor, validate)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              SQLite Database ($DATABASE_PATH)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (sale, product, etc.)
//! - [`jobs`] - The four batch jobs
//! - [`config`] - Environment configuration for the programs
//! - [`cli`] - Argument parsing and tracing setup shared by the programs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./bazaar_dev.db")).await?;
//!
//! let mut rng = config.rng();
//! bazaar_db::jobs::seed_catalog(&db, 200, &mut rng).await?;
//! let report = bazaar_db::jobs::validate_data(&db).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod jobs;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError};
pub use error::{DbError, DbResult};
pub use jobs::{JobError, JobResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::{BatchInsertReport, FailedSale, SaleRepository};
pub use repository::sequence::SequenceRepository;
