//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In JavaScript/floating point:                                      │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  The source system parsed amount strings to floats at every call    │
//! │  site and compared with a 0.01 tolerance. We instead keep every     │
//! │  amount in integer paise (1 rupee = 100 paise), so the ledger       │
//! │  invariant paid + credit == total holds EXACTLY.                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use khata_core::money::Money;
//!
//! // Create from paise (preferred)
//! let price = Money::from_paise(10050); // ₹100.50
//!
//! // Parse once at the API boundary, never at call sites
//! let amount = Money::parse_rupees("100.50").unwrap();
//! assert_eq!(amount, price);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in integer paise (1/100 rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate arithmetic (e.g. total − paid) may dip
///   negative before being validated; storage is always non-negative
/// - **Single-field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
///
/// Every amount in the system flows through this type: product base prices,
/// sale totals, payment splits, credit balances, collections, discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
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

    /// Returns the rupee (major unit) portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise (minor unit) portion, always 0-99.
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, returning `None` on i64 overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Multiplies by a quantity to get a line total, returning `None` on
    /// i64 overflow. An extreme-but-parseable price times a large quantity
    /// must surface as a validation error, never wrap.
    ///
    /// ## Example
    /// ```rust
    /// use khata_core::money::Money;
    ///
    /// let unit_price = Money::from_rupees(100);
    /// assert_eq!(unit_price.checked_mul_quantity(3), Some(Money::from_rupees(300)));
    /// assert_eq!(Money::from_paise(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Parses a user-entered rupee amount ("100", "100.5", "100.50").
    ///
    /// This is the single validated coercion point for amount strings.
    /// The source parsed defensively at every read; here a malformed string
    /// is rejected once, at the boundary.
    ///
    /// ## Rules
    /// - Optional fractional part of at most two digits
    /// - No sign, no currency symbol, no thousands separators
    /// - Empty or whitespace-only input is rejected
    pub fn parse_rupees(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();

        if input.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let (whole, frac) = match input.split_once('.') {
            Some((w, f)) => (w, f),
            None => (input, ""),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be a plain decimal number"));
        }
        if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("at most two decimal places"));
        }

        let rupees: i64 = whole
            .parse()
            .map_err(|_| invalid("amount too large"))?;

        // "5" -> 50 paise, "50" -> 50 paise
        let paise: i64 = if frac.is_empty() {
            0
        } else if frac.len() == 1 {
            frac.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10
        } else {
            frac.parse::<i64>().map_err(|_| invalid("bad fraction"))?
        };

        rupees
            .checked_mul(100)
            .and_then(|r| r.checked_add(paise))
            .map(Money)
            .ok_or_else(|| invalid("amount too large"))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money in a human-readable rupee format.
///
/// For debugging and CSV cells; UI formatting belongs to the frontend.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

/// Default money is zero.
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

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(10099);
        assert_eq!(money.paise(), 10099);
        assert_eq!(money.rupees(), 100);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(10099)), "₹100.99");
        assert_eq!(format!("{}", Money::from_paise(500)), "₹5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::zero()), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300]
            .iter()
            .map(|p| Money::from_paise(*p))
            .sum();
        assert_eq!(total.paise(), 600);
    }

    #[test]
    fn test_parse_rupees() {
        assert_eq!(Money::parse_rupees("100").unwrap().paise(), 10000);
        assert_eq!(Money::parse_rupees("100.5").unwrap().paise(), 10050);
        assert_eq!(Money::parse_rupees("100.50").unwrap().paise(), 10050);
        assert_eq!(Money::parse_rupees(" 0.99 ").unwrap().paise(), 99);
    }

    #[test]
    fn test_parse_rupees_rejects_garbage() {
        assert!(Money::parse_rupees("").is_err());
        assert!(Money::parse_rupees("abc").is_err());
        assert!(Money::parse_rupees("1.234").is_err());
        assert!(Money::parse_rupees("-5").is_err());
        assert!(Money::parse_rupees("₹5").is_err());
        assert!(Money::parse_rupees("1,000").is_err());
    }

    #[test]
    fn test_checked_mul_quantity() {
        let unit_price = Money::from_rupees(100);
        assert_eq!(unit_price.checked_mul_quantity(3), Some(Money::from_paise(30000)));
        assert_eq!(Money::from_paise(i64::MAX).checked_mul_quantity(2), None);
    }

    #[test]
    fn test_checked_add() {
        let a = Money::from_paise(1000);
        assert_eq!(a.checked_add(Money::from_paise(500)), Some(Money::from_paise(1500)));
        assert_eq!(Money::from_paise(i64::MAX).checked_add(Money::from_paise(1)), None);
    }
}
