//! # Validation Module
//!
//! Construction-time validation for catalog and stock records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (before insert)                                  │
//! │  ├── Field format (sku, names, codes)                                  │
//! │  └── Cross-field rules (selling > cost, reorder < max)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / FOREIGN KEY                                   │
//! │  └── CHECK (quantity >= 0)                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Consistency validator (after the fact, read-only)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{BranchStock, Product};
use crate::MAX_ITEM_QUANTITY;

pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ```rust
/// use bazaar_core::validation::validate_sku;
///
/// assert!(validate_sku("DAI-MIL-004").is_ok());
/// assert!(validate_sku("").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (products, branches, customers).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a short business code (branch `BLR-01`, category `DAI`).
pub fn validate_code(field: &str, code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if code.len() > 20 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 20,
        });
    }

    if !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only upper-case letters, digits, and hyphens".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in paise. Zero is allowed (free items).
pub fn validate_price_paise(field: &str, paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a rate in basis points (0% to 100%).
pub fn validate_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates the pricing block of a product.
///
/// ## Rules
/// - `selling_price > cost_price`
/// - `mrp >= selling_price` (retail may not exceed the printed MRP)
///
/// ```rust
/// use bazaar_core::money::Money;
/// use bazaar_core::validation::validate_pricing;
///
/// let ok = validate_pricing(Money::from_rupees(40), Money::from_rupees(50), Money::from_rupees(55));
/// assert!(ok.is_ok());
///
/// let loss = validate_pricing(Money::from_rupees(50), Money::from_rupees(50), Money::from_rupees(55));
/// assert!(loss.is_err());
/// ```
pub fn validate_pricing(cost: Money, selling: Money, mrp: Money) -> ValidationResult<()> {
    validate_price_paise("cost_price", cost.paise())?;

    if selling <= cost {
        return Err(ValidationError::RuleViolation {
            field: "selling_price".to_string(),
            rule: format!("must exceed cost price ({} <= {})", selling, cost),
        });
    }

    if mrp < selling {
        return Err(ValidationError::RuleViolation {
            field: "mrp".to_string(),
            rule: format!("must not be below selling price ({} < {})", mrp, selling),
        });
    }

    Ok(())
}

/// Validates a stock record before it is written.
///
/// ## Rules
/// - quantity, reorder_level, reserved_quantity are non-negative
/// - reorder_level < max_stock_level
pub fn validate_branch_stock(stock: &BranchStock) -> ValidationResult<()> {
    for (field, value) in [
        ("quantity", stock.quantity),
        ("reorder_level", stock.reorder_level),
        ("reserved_quantity", stock.reserved_quantity),
    ] {
        if value < 0 {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }

    if stock.reorder_level >= stock.max_stock_level {
        return Err(ValidationError::RuleViolation {
            field: "reorder_level".to_string(),
            rule: format!(
                "must be below max_stock_level ({} >= {})",
                stock.reorder_level, stock.max_stock_level
            ),
        });
    }

    Ok(())
}

/// Validates a product record (identity, pricing, GST slab).
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_sku(&product.sku)?;
    validate_name("name", &product.name)?;
    validate_rate_bps("gst_rate", product.gst_rate_bps)?;
    validate_pricing(
        product.cost_price(),
        product.selling_price(),
        product.mrp(),
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(quantity: i64, reorder: i64, max: i64) -> BranchStock {
        BranchStock {
            id: "s".into(),
            product_id: "p".into(),
            branch_id: "b".into(),
            quantity,
            reorder_level: reorder,
            max_stock_level: max,
            reserved_quantity: 0,
            location: None,
            last_restocked: None,
        }
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("GRC-RIC-001").is_ok());
        assert!(validate_sku("product_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("code", "BLR-01").is_ok());
        assert!(validate_code("code", "blr").is_err());
        assert!(validate_code("code", "").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_rate_bps() {
        assert!(validate_rate_bps("gst_rate", 0).is_ok());
        assert!(validate_rate_bps("gst_rate", 2800).is_ok());
        assert!(validate_rate_bps("gst_rate", 10001).is_err());
    }

    #[test]
    fn test_validate_pricing() {
        let cost = Money::from_rupees(80);
        assert!(validate_pricing(cost, Money::from_rupees(95), Money::from_rupees(99)).is_ok());
        assert!(validate_pricing(cost, Money::from_rupees(79), Money::from_rupees(99)).is_err());
        assert!(validate_pricing(cost, Money::from_rupees(95), Money::from_rupees(90)).is_err());
    }

    #[test]
    fn test_validate_branch_stock() {
        assert!(validate_branch_stock(&stock(50, 10, 90)).is_ok());
        assert!(validate_branch_stock(&stock(0, 5, 10)).is_ok());
        assert!(validate_branch_stock(&stock(-1, 5, 10)).is_err());
        assert!(validate_branch_stock(&stock(50, 90, 90)).is_err());
    }
}
