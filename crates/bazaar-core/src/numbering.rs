//! # Document Numbering
//!
//! Sale and invoice numbers: `prefix + YYYYMMDD + zero-padded sequence`.
//!
//! ```text
//! SAL 20260314 000123
//! ─┬─ ───┬──── ───┬──
//!  │     │        └── sequence (shared by sale and invoice number)
//!  │     └── sale date
//!  └── prefix
//! ```
//!
//! The sequence itself is allocated by the database counter in bazaar-db;
//! this module only formats and parses.

use chrono::NaiveDate;

pub const SALE_PREFIX: &str = "SAL";
pub const INVOICE_PREFIX: &str = "INV";

/// Minimum digits of the sequence part.
pub const SEQUENCE_WIDTH: usize = 6;

const DATE_WIDTH: usize = 8;

/// Formats a document number.
///
/// ```rust
/// use bazaar_core::numbering::{format_number, SALE_PREFIX};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
/// assert_eq!(format_number(SALE_PREFIX, date, 123), "SAL20260314000123");
/// ```
pub fn format_number(prefix: &str, date: NaiveDate, sequence: u64) -> String {
    format!(
        "{}{}{:0width$}",
        prefix,
        date.format("%Y%m%d"),
        sequence,
        width = SEQUENCE_WIDTH
    )
}

/// Both numbers a sale carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleNumbers {
    pub sale_number: String,
    pub invoice_number: String,
}

impl SaleNumbers {
    pub fn new(date: NaiveDate, sequence: u64) -> Self {
        SaleNumbers {
            sale_number: format_number(SALE_PREFIX, date, sequence),
            invoice_number: format_number(INVOICE_PREFIX, date, sequence),
        }
    }
}

/// Extracts the sequence suffix from a document number.
///
/// Returns `None` when the prefix does not match or the rest is not
/// `YYYYMMDD` followed by digits.
pub fn parse_sequence(prefix: &str, number: &str) -> Option<u64> {
    let rest = number.strip_prefix(prefix)?;
    if rest.len() <= DATE_WIDTH || !rest.is_ascii() {
        return None;
    }

    let (date, sequence) = rest.split_at(DATE_WIDTH);
    NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    if !sequence.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    sequence.parse().ok()
}

/// Highest sequence found among existing numbers (0 when none parse).
pub fn max_sequence<'a, I>(prefix: &str, numbers: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    numbers
        .into_iter()
        .filter_map(|n| parse_sequence(prefix, n))
        .max()
        .unwrap_or(0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn test_sale_numbers_share_sequence() {
        let numbers = SaleNumbers::new(date(), 42);
        assert_eq!(numbers.sale_number, "SAL20260314000042");
        assert_eq!(numbers.invoice_number, "INV20260314000042");
    }

    #[test]
    fn test_sequence_wider_than_padding() {
        assert_eq!(format_number(SALE_PREFIX, date(), 1_234_567), "SAL202603141234567");
        assert_eq!(parse_sequence(SALE_PREFIX, "SAL202603141234567"), Some(1_234_567));
    }

    #[test]
    fn test_parse_sequence_rejects_garbage() {
        assert_eq!(parse_sequence(SALE_PREFIX, "SAL20260314000042"), Some(42));
        assert_eq!(parse_sequence(SALE_PREFIX, "INV20260314000042"), None);
        assert_eq!(parse_sequence(SALE_PREFIX, "SAL20261399000042"), None);
        assert_eq!(parse_sequence(SALE_PREFIX, "SAL20260314"), None);
        assert_eq!(parse_sequence(SALE_PREFIX, "SAL2026031400A042"), None);
    }

    #[test]
    fn test_max_sequence() {
        let existing = ["SAL20260301000007", "SAL20260302000019", "legacy-1"];
        assert_eq!(max_sequence(SALE_PREFIX, existing), 19);
        assert_eq!(max_sequence(SALE_PREFIX, std::iter::empty()), 0);
    }
}
