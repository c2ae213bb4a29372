//! # Line and Sale Arithmetic
//!
//! The single place where a sale's money is computed. The builder uses it
//! to produce amounts; the consistency validator uses it to recompute them.
//!
//! ## Line Formula
//! ```text
//! item_total      = unit_price × quantity
//! discount_amount = item_total × discount%
//! taxable_amount  = item_total − discount_amount
//! tax_amount      = taxable_amount × gst%
//! line_total      = taxable_amount + tax_amount
//! ```
//!
//! ## Sale Formula
//! ```text
//! subtotal       = Σ item_total
//! total_discount = Σ discount_amount
//! total_tax      = Σ tax_amount
//! total          = subtotal − total_discount + total_tax
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Rate, SaleItem};

/// Computed amounts for one sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    pub item_total: Money,
    pub discount_amount: Money,
    pub taxable_amount: Money,
    pub tax_amount: Money,
    pub line_total: Money,
}

impl LineAmounts {
    /// Computes every amount of a line from its inputs.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    /// use bazaar_core::pricing::LineAmounts;
    /// use bazaar_core::types::Rate;
    ///
    /// let line = LineAmounts::compute(Money::from_rupees(100), 3, Rate::zero(), Rate::from_percent(12));
    /// assert_eq!(line.item_total, Money::from_rupees(300));
    /// assert_eq!(line.tax_amount, Money::from_rupees(36));
    /// assert_eq!(line.line_total, Money::from_rupees(336));
    /// ```
    pub fn compute(unit_price: Money, quantity: i64, discount: Rate, gst: Rate) -> Self {
        let item_total = unit_price.multiply_quantity(quantity);
        let discount_amount = item_total.apply_rate(discount);
        let taxable_amount = item_total - discount_amount;
        let tax_amount = taxable_amount.apply_rate(gst);

        LineAmounts {
            item_total,
            discount_amount,
            taxable_amount,
            tax_amount,
            line_total: taxable_amount + tax_amount,
        }
    }

    /// Recomputes the amounts a stored item should carry.
    pub fn expected_for(item: &SaleItem) -> Self {
        Self::compute(
            item.unit_price(),
            item.quantity,
            item.discount_rate(),
            item.tax_rate(),
        )
    }
}

/// Aggregate amounts of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub total_discount: Money,
    pub total_tax: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Builds totals from computed line amounts.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a LineAmounts>,
    {
        let mut totals = SaleTotals::default();
        for line in lines {
            totals.subtotal += line.item_total;
            totals.total_discount += line.discount_amount;
            totals.total_tax += line.tax_amount;
        }
        totals.total = totals.subtotal - totals.total_discount + totals.total_tax;
        totals
    }

    /// Builds totals from the amounts stored on sale items.
    ///
    /// `subtotal` uses `quantity × unit_price`; discount and tax use the
    /// stored per-line values, exactly as the validator compares them.
    pub fn from_items(items: &[SaleItem]) -> Self {
        let subtotal: Money = items.iter().map(SaleItem::item_total).sum();
        let total_discount: Money = items.iter().map(SaleItem::discount_amount).sum();
        let total_tax: Money = items.iter().map(SaleItem::tax_amount).sum();

        SaleTotals {
            subtotal,
            total_discount,
            total_tax,
            total: subtotal - total_discount + total_tax,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
