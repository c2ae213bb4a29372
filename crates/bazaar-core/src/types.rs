//! # Domain Types
//!
//! Core domain types shared by the builder, the distributor, the validator
//! and the database layer.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌──────────────────┐    ┌─────────────────┐        │
//! │  │   Branch    │◄───│   BranchStock    │───►│    Product      │        │
//! │  │  code       │    │  quantity        │    │  sku            │        │
//! │  │  is_primary │    │  reorder_level   │    │  cost / selling │        │
//! │  └─────────────┘    │  max_stock_level │    │  mrp / gst_bps  │        │
//! │        ▲            └──────────────────┘    └───────┬─────────┘        │
//! │        │                                            │ category_id      │
//! │  ┌─────┴───────┐    ┌──────────────────┐    ┌───────▼─────────┐        │
//! │  │    Sale     │───►│    SaleItem      │    │    Category     │        │
//! │  │ sale_number │    │  qty × price     │    │  gst_rate_bps   │        │
//! │  │ totals      │    │  discount / tax  │    └─────────────────┘        │
//! │  └─────┬───────┘    └──────────────────┘                               │
//! │        │ customer_id (optional, walk-in = None)                        │
//! │  ┌─────▼───────┐                                                       │
//! │  │  Customer   │  total_spent, total_purchases, loyalty_tier           │
//! │  └─────────────┘                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, code, customer_number, sale_number) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A percentage rate in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000.
/// GST slabs (0, 5, 12, 18, 28%) and discounts (5-15%) are all exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage (`12` → 12%).
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        Rate(pct * 100)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Branch
// =============================================================================

/// A physical store location; the unit of stock and sales partitioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Branch {
    pub id: String,
    /// Short business code, e.g. `BLR-01`.
    pub code: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// The flagship branch carries the full catalog.
    pub is_primary: bool,
    /// Default tax rate for the branch (settings block).
    pub tax_rate_bps: u32,
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Category
// =============================================================================

/// Product category. Owns the GST slab its products are expected to use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub code: String,
    pub name: String,
    pub gst_rate_bps: u32,
    pub created_at: DateTime<Utc>,
}

impl Category {
    #[inline]
    pub fn gst_rate(&self) -> Rate {
        Rate::from_bps(self.gst_rate_bps)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product with its pricing block and per-branch stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub barcode: Option<String>,
    pub name: String,
    pub category_id: String,
    pub brand: Option<String>,
    /// Selling unit, e.g. `pcs`, `kg`, `ltr`.
    pub unit: String,
    pub cost_price_paise: i64,
    pub selling_price_paise: i64,
    pub mrp_paise: i64,
    pub gst_rate_bps: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Stock records, one per branch. Loaded separately from `branch_stock`.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub stock_by_branch: Vec<BranchStock>,
}

impl Product {
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_paise(self.cost_price_paise)
    }

    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_paise(self.selling_price_paise)
    }

    #[inline]
    pub fn mrp(&self) -> Money {
        Money::from_paise(self.mrp_paise)
    }

    #[inline]
    pub fn gst_rate(&self) -> Rate {
        Rate::from_bps(self.gst_rate_bps)
    }

    /// Returns the stock record for a branch, if the product is carried there.
    pub fn stock_at(&self, branch_id: &str) -> Option<&BranchStock> {
        self.stock_by_branch.iter().find(|s| s.branch_id == branch_id)
    }

    /// Quantity on hand at a branch (zero when not carried).
    pub fn quantity_at(&self, branch_id: &str) -> i64 {
        self.stock_at(branch_id).map(|s| s.quantity).unwrap_or(0)
    }
}

// =============================================================================
// Branch Stock
// =============================================================================

/// Stock of one product at one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BranchStock {
    pub id: String,
    pub product_id: String,
    pub branch_id: String,
    /// Units on hand. Never negative.
    pub quantity: i64,
    pub reorder_level: i64,
    pub max_stock_level: i64,
    pub reserved_quantity: i64,
    /// Shelf location code, e.g. `C-07`.
    pub location: Option<String>,
    pub last_restocked: Option<DateTime<Utc>>,
}

impl BranchStock {
    /// At or below the reorder threshold.
    pub fn is_below_reorder(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Cashier,
}

/// Staff member. Referenced by sales as `created_by`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: UserRole,
    /// Home branch. Admins are not tied to one.
    pub branch_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

/// Customer classification; drives basket size in generated sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum CustomerGroup {
    Vip,
    Regular,
    Retail,
}

/// Loyalty tier derived from cumulative spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Default for LoyaltyTier {
    fn default() -> Self {
        LoyaltyTier::Bronze
    }
}

/// A registered customer with cumulative purchase stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub customer_number: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub customer_group: CustomerGroup,
    pub total_spent_paise: i64,
    pub total_purchases: i64,
    pub average_order_value_paise: i64,
    pub loyalty_points: i64,
    pub loyalty_tier: LoyaltyTier,
    pub credit_limit_paise: i64,
    pub current_balance_paise: i64,
    pub last_purchase_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    #[inline]
    pub fn total_spent(&self) -> Money {
        Money::from_paise(self.total_spent_paise)
    }

    #[inline]
    pub fn average_order_value(&self) -> Money {
        Money::from_paise(self.average_order_value_paise)
    }
}

// =============================================================================
// Sale Status / Payment Method
// =============================================================================

/// Status of a sale. Only refund/cancel transitions happen after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Cancelled,
    Refunded,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Netbanking,
}

impl PaymentMethod {
    /// Upper-case code used as the payment reference prefix.
    pub const fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Netbanking => "NETBANKING",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A checkout transaction. Immutable after creation except for `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub sale_number: String,
    pub invoice_number: String,
    pub branch_id: String,
    /// `None` for walk-in customers.
    pub customer_id: Option<String>,
    pub status: SaleStatus,
    pub subtotal_paise: i64,
    pub total_discount_paise: i64,
    pub total_tax_paise: i64,
    pub total_paise: i64,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub amount_paid_paise: i64,
    pub change_amount_paise: i64,
    /// Cashier user id.
    pub created_by: String,
    pub created_at: DateTime<Utc>,

    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<SaleItem>,
}

impl Sale {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_paise(self.subtotal_paise)
    }

    #[inline]
    pub fn total_discount(&self) -> Money {
        Money::from_paise(self.total_discount_paise)
    }

    #[inline]
    pub fn total_tax(&self) -> Money {
        Money::from_paise(self.total_tax_paise)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    /// Zero-based order within the sale.
    pub position: i64,
    pub product_id: String,
    pub sku_snapshot: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price_paise: i64,
    pub cost_price_paise: i64,
    pub discount_bps: u32,
    pub discount_amount_paise: i64,
    pub tax_rate_bps: u32,
    pub tax_amount_paise: i64,
    /// Taxable amount plus tax.
    pub line_total_paise: i64,
}

impl SaleItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paise(self.unit_price_paise)
    }

    /// `unit_price × quantity`, before discount and tax.
    #[inline]
    pub fn item_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn discount_amount(&self) -> Money {
        Money::from_paise(self.discount_amount_paise)
    }

    #[inline]
    pub fn tax_amount(&self) -> Money {
        Money::from_paise(self.tax_amount_paise)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_paise(self.line_total_paise)
    }

    #[inline]
    pub fn tax_rate(&self) -> Rate {
        Rate::from_bps(self.tax_rate_bps)
    }

    #[inline]
    pub fn discount_rate(&self) -> Rate {
        Rate::from_bps(self.discount_bps)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
