//! Batch program configuration.
//!
//! Configuration is loaded from environment variables (after reading `.env`
//! when present) with fallback to defaults.

use std::env;
use std::io;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use bazaar_core::Money;

pub const DEFAULT_DATABASE_PATH: &str = "./bazaar_dev.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Production,
}

/// Settings shared by the four batch programs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    pub environment: Environment,

    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,

    /// Customers created by `seed`
    pub seed_customers: usize,

    /// Inventory value at cost each branch should hold
    pub inventory_target_per_branch: Money,

    /// Days of sales history generated by `seed-sales`
    pub sales_days: u32,

    pub sales_per_branch_per_day: u32,

    /// Drafts persisted per `insert_batch` call
    pub sales_batch_size: usize,
}

impl AppConfig {
    /// Load configuration from `.env` and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        read_env_file(dotenvy::dotenv())?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = AppConfig {
            database_path: lookup("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
                .into(),

            environment: match lookup("BAZAAR_ENV").as_deref() {
                None | Some("development") | Some("dev") => Environment::Development,
                Some("production") | Some("prod") => Environment::Production,
                Some(other) => {
                    return Err(ConfigError::InvalidValue {
                        key: "BAZAAR_ENV".to_string(),
                        value: other.to_string(),
                    })
                }
            },

            seed: lookup("BAZAAR_SEED")
                .map(|v| parse_value("BAZAAR_SEED", &v))
                .transpose()?,

            seed_customers: parse_or(&lookup, "SEED_CUSTOMERS", 200)?,

            inventory_target_per_branch: parse_rupees_or(
                &lookup,
                "INVENTORY_TARGET_PER_BRANCH",
                500_000,
            )?,

            sales_days: parse_or(&lookup, "SALES_DAYS", 30)?,

            sales_per_branch_per_day: parse_or(&lookup, "SALES_PER_BRANCH_PER_DAY", 20)?,

            sales_batch_size: parse_or(&lookup, "SALES_BATCH_SIZE", 50)?,
        };

        if !config.inventory_target_per_branch.is_positive() {
            return Err(ConfigError::InvalidValue {
                key: "INVENTORY_TARGET_PER_BRANCH".to_string(),
                value: config.inventory_target_per_branch.rupees().to_string(),
            });
        }
        if config.sales_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SALES_BATCH_SIZE".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(config)
    }

    /// Overrides the database path (the `--db` flag).
    pub fn with_database_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database_path = path;
        }
        self
    }

    /// RNG for a run: seeded when `BAZAAR_SEED` is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => parse_value(key, &value),
        None => Ok(default),
    }
}

/// Whole rupees converted to paise; values that overflow are rejected.
fn parse_rupees_or<F>(lookup: &F, key: &str, default: i64) -> Result<Money, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let rupees: i64 = parse_or(lookup, key, default)?;
    rupees
        .checked_mul(100)
        .map(Money::from_paise)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            value: rupees.to_string(),
        })
}

/// A missing `.env` is fine; the process environment still applies.
fn read_env_file(result: Result<PathBuf, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(path) => {
            debug!(path = %path.display(), "Loaded .env");
            Ok(())
        }
        Err(dotenvy::Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(ConfigError::EnvFile(err)),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Failed to read .env: {0}")]
    EnvFile(#[from] dotenvy::Error),
}
