//! Shared plumbing for the batch programs: argument parsing and logging.
//!
//! The programs take almost everything from the environment (see
//! [`crate::config`]); the command line only carries `--db` and `--help`.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// `--db <PATH>` override of `DATABASE_PATH`.
    pub db_path: Option<PathBuf>,
    pub help: bool,
}

/// Command line errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CliError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
}

impl CliArgs {
    /// Parses arguments (without the program name).
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" | "-d" => {
                    let value = args.next().ok_or_else(|| CliError::MissingValue(arg.clone()))?;
                    parsed.db_path = Some(PathBuf::from(value));
                }
                "--help" | "-h" => parsed.help = true,
                _ => return Err(CliError::UnknownArgument(arg)),
            }
        }

        Ok(parsed)
    }
}

/// Prints the usage text shared by every program.
pub fn print_usage(program: &str, summary: &str) {
    println!("Bazaar {program}");
    println!("{summary}");
    println!();
    println!("Usage: {program} [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -d, --db <PATH>    Database file path (default: $DATABASE_PATH or ./bazaar_dev.db)");
    println!("  -h, --help         Show this help message");
    println!();
    println!("Environment: DATABASE_PATH, BAZAAR_ENV, BAZAAR_SEED, SEED_CUSTOMERS,");
    println!("             INVENTORY_TARGET_PER_BRANCH, SALES_DAYS, SALES_PER_BRANCH_PER_DAY,");
    println!("             SALES_BATCH_SIZE, RUST_LOG");
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bazaar_db=trace` - Trace the database layer only
/// - Default: INFO, sqlx at WARN
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_db_and_help() {
        let parsed = CliArgs::parse(args(&["--db", "/tmp/x.db", "-h"])).unwrap();
        assert_eq!(parsed.db_path, Some(PathBuf::from("/tmp/x.db")));
        assert!(parsed.help);

        assert_eq!(CliArgs::parse(args(&[])).unwrap(), CliArgs::default());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            CliArgs::parse(args(&["--db"])),
            Err(CliError::MissingValue("--db".into()))
        );
        assert_eq!(
            CliArgs::parse(args(&["--count", "5"])),
            Err(CliError::UnknownArgument("--count".into()))
        );
    }
}
