//! # Error Types
//!
//! Domain-specific error types for khata-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  khata-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  khata-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  API errors (apps/api)                                              │
//! │  └── ApiError         - What HTTP clients see (serialized)          │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, phone, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent ledger-rule violations. They are raised before (or inside)
/// a write and should be translated to user-friendly messages at the edge.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity exceeds the product's current stock.
    ///
    /// Raised before a sale or regular bill is written, and again by the
    /// conditional decrement inside the transaction if a concurrent sale
    /// got there first.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Payment split does not add up.
    ///
    /// A sale must satisfy paid + credit == total, exactly (integer paise).
    #[error("Payment split invalid: paid {paid} + credit {credit} != total {total}")]
    PaymentSplitMismatch { paid: i64, credit: i64, total: i64 },

    /// Paid amount exceeds the sale total.
    #[error("Paid amount {paid} exceeds total {total}")]
    Overpayment { paid: i64, total: i64 },

    /// A collection would push a market credit's outstanding below zero.
    #[error("Collection {amount} exceeds outstanding balance {outstanding}")]
    OverCollection { amount: i64, outstanding: i64 },

    /// A credit request is already approved or rejected.
    ///
    /// Approval and rejection are terminal transitions.
    #[error("Credit request {id} is already {status}")]
    RequestAlreadyDecided { id: String, status: String },

    /// An order is not in a state that allows the requested transition.
    #[error("Order {id} is {status}, cannot perform operation")]
    InvalidOrderStatus { id: String, status: String },

    /// A payment against a pending payment would exceed what is owed.
    #[error("Payment {amount} exceeds pending amount {pending}")]
    PendingOverpayment { amount: i64, pending: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements and are rejected
/// before any write happens.
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (phone, email, UUID, money string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Discount larger than the bill subtotal.
    #[error("discount {discount} exceeds subtotal {subtotal}")]
    DiscountExceedsSubtotal { discount: i64, subtotal: i64 },

    /// Amount arithmetic overflowed the integer paise range.
    #[error("{field} amount is too large")]
    Overflow { field: String },
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
            product: "Sunflower Oil 1L".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Sunflower Oil 1L: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "rejectionReason".to_string(),
        };
        assert_eq!(err.to_string(), "rejectionReason is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
