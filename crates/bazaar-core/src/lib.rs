//! # bazaar-core: Sales and Inventory Rules for Bazaar
//!
//! Pure business logic for a multi-branch supermarket: the arithmetic of a
//! sale, how starting stock is distributed across branches, how customer
//! stats accumulate, and how stored data is checked for consistency.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Bazaar Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Batch Programs (bazaar-db)                   │   │
//! │  │  seed ──► distribute-inventory ──► seed-sales ──► validate-data │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐ ┌────────────┐ ┌────────────┐ ┌────────────┐  │   │
//! │  │   │sale_builder│ │ inventory  │ │   ledger   │ │consistency │  │   │
//! │  │   │ SaleDraft  │ │ StockPlan  │ │add_purchase│ │ Validation │  │   │
//! │  │   │            │ │            │ │            │ │   Report   │  │   │
//! │  │   └─────┬──────┘ └────────────┘ └────────────┘ └─────┬──────┘  │   │
//! │  │         └──────── pricing / payment / numbering ─────┘         │   │
//! │  │                  money • types • validation                    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • RANDOMNESS INJECTED AS &mut Rng       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bazaar-db (Database Layer)                   │   │
//! │  │      SQLite repositories, migrations, config, batch jobs        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Customer, etc.)
//! - [`money`] - Money in paise with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field and record validation
//! - [`pricing`] - Line and sale amount formulas
//! - [`payment`] - Payment method draw and tender settlement
//! - [`numbering`] - Sale and invoice numbers
//! - [`ledger`] - Customer purchase stats and loyalty tiers
//! - [`sale_builder`] - Sale Transaction Builder
//! - [`inventory`] - Inventory Distributor
//! - [`consistency`] - Consistency Validator
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::money::Money;
//! use bazaar_core::pricing::LineAmounts;
//! use bazaar_core::types::Rate;
//!
//! // ₹250 × 4 with a 10% discount at 18% GST
//! let line = LineAmounts::compute(
//!     Money::from_rupees(250),
//!     4,
//!     Rate::from_percent(10),
//!     Rate::from_percent(18),
//! );
//!
//! assert_eq!(line.discount_amount, Money::from_rupees(100));
//! assert_eq!(line.tax_amount, Money::from_rupees(162));
//! assert_eq!(line.line_total, Money::from_rupees(1062));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod consistency;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod money;
pub mod numbering;
pub mod payment;
pub mod pricing;
pub mod sale_builder;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single sale line.
///
/// Checked on every line before a sale is written.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Currency every branch trades in.
pub const DEFAULT_CURRENCY: &str = "INR";
