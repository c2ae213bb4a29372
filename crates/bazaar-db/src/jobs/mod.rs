//! # Batch Jobs
//!
//! The four programs are thin wrappers around these functions, run in order:
//!
//! ```text
//! ┌────────────┐   ┌──────────────────────┐   ┌────────────┐   ┌───────────────┐
//! │    seed    │──►│ distribute-inventory │──►│ seed-sales │──►│ validate-data │
//! │            │   │                      │   │            │   │               │
//! │ branches   │   │ branch_stock per     │   │ sales +    │   │ read-only     │
//! │ catalog    │   │ branch (upsert)      │   │ items,     │   │ report        │
//! │ staff      │   │                      │   │ stock ↓    │   │               │
//! │ customers  │   │                      │   │ stats ↑    │   │               │
//! └────────────┘   └──────────────────────┘   └────────────┘   └───────────────┘
//! ```
//!
//! Every job takes the [`Database`](crate::Database) and, when it generates
//! data, an injected `Rng` so tests run deterministically.

pub mod catalog;
pub mod distribute;
pub mod sales;
pub mod validate;

use thiserror::Error;

use crate::error::DbError;
use bazaar_core::CoreError;

pub use catalog::{seed_catalog, SeedSummary};
pub use distribute::distribute_inventory;
pub use sales::{seed_sales, SalesOptions, SalesSummary};
pub use validate::validate_data;

/// Errors that abort a job.
#[derive(Debug, Error)]
pub enum JobError {
    /// An earlier job has not been run (no branches, products or staff).
    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type JobResult<T> = Result<T, JobError>;
