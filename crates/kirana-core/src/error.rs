//! # Error Types
//!
//! Domain-specific error types for kirana-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kirana-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  kirana-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                     │
//! │  └── BillingError     - Billing transaction outcomes                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → BillingError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, ID, etc.)
//! 3. Errors are enum variants, never String
//! 4. Validation errors are raised before any state is mutated

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are surfaced to
/// the caller with no state mutated.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item cannot be found for this owner.
    ///
    /// Also raised when the item exists but belongs to a different owner,
    /// or has been deactivated: cross-owner probing must not be able to
    /// distinguish "not yours" from "not there".
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Bill cannot be found for this owner.
    #[error("Bill not found: {0}")]
    BillNotFound(String),

    /// Insufficient stock to commit a bill line.
    ///
    /// Raised inside the billing transaction, after any edit-mode
    /// reversal, before any consumption batch is written.
    ///
    /// ```text
    /// Commit cart (qty: 5)
    ///      │
    ///      ▼
    /// Ledger says: available = 3
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "RICE-5KG", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, bad characters in a SKU).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A bill must carry at least one line.
    #[error("bill must contain at least one line item")]
    EmptyBill,

    /// Bill has exceeded the maximum allowed line count.
    #[error("bill cannot have more than {max} line items")]
    TooManyLines { max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
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
            sku: "RICE-5KG".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for RICE-5KG: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer name".to_string(),
        };
        assert_eq!(err.to_string(), "customer name is required");

        assert_eq!(
            ValidationError::EmptyBill.to_string(),
            "bill must contain at least one line item"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::EmptyBill;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
