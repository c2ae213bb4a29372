//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bazaar-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── JobError         - Batch job preconditions                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → JobError → exit(1)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Consistency findings are NOT errors: the validator reports them as data.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Branch stock cannot cover the requested quantity.
    ///
    /// ## When This Occurs
    /// - The guarded stock decrement of a sale finds fewer units than sold
    /// - Two seed runs race on the same branch
    #[error("Insufficient stock for {sku} at branch {branch_id}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        branch_id: String,
        available: i64,
        requested: i64,
    },

    /// A sale draft carries no line items.
    #[error("Sale has no line items")]
    EmptySale,

    /// Payment weights sum to zero.
    #[error("Invalid payment mix: {reason}")]
    InvalidPaymentMix { reason: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A cross-field rule is broken (e.g. selling price below cost).
    #[error("{field} violates rule: {rule}")]
    RuleViolation { field: String, rule: String },

    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            sku: "GRC-RIC-001".to_string(),
            branch_id: "b1".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for GRC-RIC-001 at branch b1: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::RuleViolation {
            field: "selling_price".to_string(),
            rule: "must exceed cost price".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "selling_price violates rule: must exceed cost price"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
