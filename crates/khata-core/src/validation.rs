//! # Validation Module
//!
//! Input validation utilities for Khata POS.
//!
//! Every form field is validated here before any write happens; malformed
//! input never reaches the database layer. The database adds its own
//! constraints (NOT NULL, CHECK stock >= 0, foreign keys) as a second net.
//!
//! ## Usage
//! ```rust
//! use khata_core::validation::{validate_phone, validate_quantity};
//!
//! validate_phone("9876543210").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum quantity of a single line item.
///
/// Prevents accidental over-entry (e.g. typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9999;

/// Maximum lines on one bill.
pub const MAX_BILL_ITEMS: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an Indian mobile number.
///
/// ## Rules
/// - Exactly 10 digits after trimming
/// - First digit 6-9
///
/// ## Example
/// ```rust
/// use khata_core::validation::validate_phone;
///
/// assert!(validate_phone("9876543210").is_ok());
/// assert!(validate_phone("12345").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be exactly 10 digits".to_string(),
        });
    }

    if !matches!(phone.as_bytes()[0], b'6'..=b'9') {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must start with 6-9".to_string(),
        });
    }

    Ok(phone.to_string())
}

/// Validates an email address.
///
/// ## Rules
/// - Non-empty, at most 254 characters
/// - Exactly one `@` with non-empty local part and a dotted domain
///
/// Intentionally shallow; the identity provider is the real authority.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim().to_ascii_lowercase();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    // Domain needs at least one dot with text on both sides
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }

    Ok(email)
}

/// Validates a required free-text field (customer name, description,
/// rejection reason).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most `max` characters
///
/// ## Returns
/// The trimmed string.
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be a positive integer (fractional quantities never reach this
///   layer: the type is i64)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount that must be strictly positive (collection,
/// market-credit principal, pending-payment instalment).
pub fn validate_positive_amount(field: &str, paise: i64) -> ValidationResult<()> {
    if paise <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an amount that may be zero but never negative (paid amount,
/// discount, base price).
pub fn validate_non_negative_amount(field: &str, paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a bill discount against its subtotal.
///
/// A discount larger than the subtotal would yield a negative bill total,
/// so it is rejected outright.
pub fn validate_discount(discount_paise: i64, subtotal_paise: i64) -> ValidationResult<()> {
    validate_non_negative_amount("discount", discount_paise)?;

    if discount_paise > subtotal_paise {
        return Err(ValidationError::DiscountExceedsSubtotal {
            discount: discount_paise,
            subtotal: subtotal_paise,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone("9876543210").unwrap(), "9876543210");
        assert_eq!(validate_phone(" 7000000000 ").unwrap(), "7000000000");

        assert!(validate_phone("").is_err());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("1234567890").is_err()); // starts with 1
        assert!(validate_phone("98765abc10").is_err());
        assert!(validate_phone("98765432101").is_err()); // 11 digits
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email("Owner@Example.COM").unwrap(), "owner@example.com");
        assert!(validate_email("staff@shop.co.in").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("user@.com").is_err());
    }

    #[test]
    fn test_validate_text() {
        assert_eq!(validate_text("name", "  Ravi  ", 100).unwrap(), "Ravi");
        assert!(validate_text("reason", "", 100).is_err());
        assert!(validate_text("reason", "   ", 100).is_err());
        assert!(validate_text("name", &"A".repeat(101), 100).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(9999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(10000).is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_positive_amount("amount", 1).is_ok());
        assert!(validate_positive_amount("amount", 0).is_err());

        assert!(validate_non_negative_amount("paid", 0).is_ok());
        assert!(validate_non_negative_amount("paid", -1).is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(0, 13000).is_ok());
        assert!(validate_discount(1000, 13000).is_ok());
        assert!(validate_discount(13000, 13000).is_ok());

        assert!(validate_discount(13001, 13000).is_err());
        assert!(validate_discount(-1, 13000).is_err());
    }
}
