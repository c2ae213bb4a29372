//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats, a sale of 3 × ₹33.30 at 18% GST:                          │
//! │    99.9 × 0.18 = 17.982000000000003                                     │
//! │  and the validator needs a ±0.01 slack to compare anything.             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    9990 paise × 1800 bps / 10000 = 1798.2 → 1798 paise                  │
//! │    Every stored amount is exact; tolerance becomes ±1 paisa             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::money::Money;
//!
//! let price = Money::from_paise(1099); // ₹10.99
//! let doubled = price * 2;             // ₹21.98
//! let total = price + Money::from_rupees(5); // ₹15.99
//! assert_eq!(total.paise(), 1599);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 rupee).
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.selling_price ──► SaleItem.unit_price ──► item_total           │
/// │                                                      │                  │
/// │                              discount_amount ◄───────┤                  │
/// │                              tax_amount      ◄── taxable               │
/// │                                                      │                  │
/// │  Sale.subtotal / total_discount / total_tax / total ◄┘                  │
/// │                                                      │                  │
/// │  Customer.total_spent ◄──────────── add_purchase ◄───┘                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let price = Money::from_paise(1099);
    /// assert_eq!(price.paise(), 1099);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a rate and returns the resulting portion of this amount.
    ///
    /// Used for both GST (`taxable × gst%`) and discounts
    /// (`item_total × discount%`).
    ///
    /// ## Implementation
    /// Integer math with half-up rounding to the paisa:
    /// `(amount × bps + 5000) / 10000`
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    /// use bazaar_core::types::Rate;
    ///
    /// // ₹300.00 at 12% GST = ₹36.00
    /// let tax = Money::from_rupees(300).apply_rate(Rate::from_percent(12));
    /// assert_eq!(tax, Money::from_rupees(36));
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        // i128 so large inventories cannot overflow the intermediate product
        let portion = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_paise(portion as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(2999);
    /// assert_eq!(unit_price.multiply_quantity(3).paise(), 8997);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Divides evenly, truncating toward zero. Returns zero for a zero divisor.
    ///
    /// Used for averages (average order value); the lost remainder is
    /// below one paisa per unit.
    pub fn divide_by(&self, divisor: i64) -> Money {
        if divisor == 0 {
            return Money::zero();
        }
        Money(self.0 / divisor)
    }

    /// True when `self` and `other` differ by at most `tolerance`.
    ///
    /// The consistency validator compares recomputed and stored amounts
    /// with a one-paisa tolerance.
    pub fn approx_eq(&self, other: Money, tolerance: Money) -> bool {
        (self.0 - other.0).abs() <= tolerance.0.abs()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}₹{}.{:02}",
            sign,
            self.rupees().abs(),
            self.paise_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
