//! # Ledger Math
//!
//! Pure payment-split and bill arithmetic. These functions decide the
//! numbers; the database layer (khata-db) applies them transactionally.
//!
//! ## Payment Split Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  method = credit        ⇒  paid = 0,     credit = total             │
//! │  method = cash | gpay:                                              │
//! │      no explicit paid   ⇒  paid = total, credit = 0                 │
//! │      paid < total       ⇒  shortfall slides into credit             │
//! │      paid > total       ⇒  rejected (Overpayment)                   │
//! │                                                                     │
//! │  Always: paid + credit == total, exactly.                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentMethod;
use crate::validation::{self, ValidationResult};

/// Credit bills fall due this many days after creation.
pub const CREDIT_BILL_DUE_DAYS: i64 = 30;

// =============================================================================
// Payment Split
// =============================================================================

/// The resolved split of a sale total between counter payment and credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSplit {
    pub paid: Money,
    pub credit: Money,
}

/// Resolves the paid/credit split for a sale.
///
/// ## Arguments
/// * `method` - how the customer paid
/// * `total` - the sale total (quantity × unit price)
/// * `explicit_paid` - the amount handed over, when the cashier entered one
///
/// ## Errors
/// * `Overpayment` if an explicit paid amount exceeds the total
pub fn split_payment(
    method: PaymentMethod,
    total: Money,
    explicit_paid: Option<Money>,
) -> CoreResult<PaymentSplit> {
    let split = match method {
        PaymentMethod::Credit => PaymentSplit {
            paid: Money::zero(),
            credit: total,
        },
        PaymentMethod::Cash | PaymentMethod::Gpay => {
            let paid = explicit_paid.unwrap_or(total);
            if paid.is_negative() {
                return Err(crate::error::ValidationError::MustBeNonNegative {
                    field: "paidAmount".to_string(),
                }
                .into());
            }
            if paid > total {
                return Err(CoreError::Overpayment {
                    paid: paid.paise(),
                    total: total.paise(),
                });
            }
            PaymentSplit {
                paid,
                credit: total - paid,
            }
        }
    };

    debug_assert_eq!(split.paid + split.credit, total);
    Ok(split)
}

/// Checks the sale invariant: paid + credit == total, exactly.
#[inline]
pub fn split_is_consistent(paid: Money, credit: Money, total: Money) -> bool {
    paid + credit == total
}

// =============================================================================
// Bill Math
// =============================================================================

/// A line on a draft bill, before ids are assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLine {
    /// References a product on regular bills; None on custom bills.
    pub product_id: Option<String>,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl DraftLine {
    /// quantity × unit price, rejecting i64 overflow.
    #[inline]
    pub fn line_total(&self) -> ValidationResult<Money> {
        self.unit_price
            .checked_mul_quantity(self.quantity)
            .ok_or_else(|| crate::error::ValidationError::Overflow {
                field: "lineTotal".to_string(),
            })
    }
}

/// Computed totals for a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

/// Computes and validates bill totals.
///
/// subtotal = Σ line totals; total = subtotal − discount. A discount larger
/// than the subtotal is rejected, so the total can never go negative.
pub fn bill_totals(lines: &[DraftLine], discount: Money) -> ValidationResult<BillTotals> {
    if lines.is_empty() {
        return Err(crate::error::ValidationError::Required {
            field: "items".to_string(),
        });
    }

    let mut subtotal = Money::zero();
    for line in lines {
        validation::validate_quantity(line.quantity)?;
        validation::validate_non_negative_amount("unitPrice", line.unit_price.paise())?;

        subtotal = subtotal.checked_add(line.line_total()?).ok_or_else(|| {
            crate::error::ValidationError::Overflow {
                field: "subtotal".to_string(),
            }
        })?;
    }

    validation::validate_discount(discount.paise(), subtotal.paise())?;

    Ok(BillTotals {
        subtotal,
        discount,
        total: subtotal - discount,
    })
}

/// Due date for a credit bill: 30 days after creation.
#[inline]
pub fn credit_due_date(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::days(CREDIT_BILL_DUE_DAYS)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_cash_full() {
        // stock=10; sell 3 @ ₹100 fully by cash
        let total = Money::from_rupees(300);
        let split = split_payment(PaymentMethod::Cash, total, None).unwrap();
        assert_eq!(split.paid, Money::from_rupees(300));
        assert_eq!(split.credit, Money::zero());
    }

    #[test]
    fn test_split_credit_method() {
        // sell 5 @ ₹100 on credit
        let total = Money::from_rupees(500);
        let split = split_payment(PaymentMethod::Credit, total, None).unwrap();
        assert_eq!(split.paid, Money::zero());
        assert_eq!(split.credit, Money::from_rupees(500));
    }

    #[test]
    fn test_split_partial_cash_slides_into_credit() {
        let total = Money::from_rupees(500);
        let split =
            split_payment(PaymentMethod::Gpay, total, Some(Money::from_rupees(200))).unwrap();
        assert_eq!(split.paid, Money::from_rupees(200));
        assert_eq!(split.credit, Money::from_rupees(300));
        assert!(split_is_consistent(split.paid, split.credit, total));
    }

    #[test]
    fn test_split_rejects_overpayment() {
        let total = Money::from_rupees(100);
        let result =
            split_payment(PaymentMethod::Cash, total, Some(Money::from_rupees(150)));
        assert!(matches!(result, Err(CoreError::Overpayment { .. })));
    }

    #[test]
    fn test_split_rejects_negative_paid() {
        let total = Money::from_rupees(100);
        let result =
            split_payment(PaymentMethod::Cash, total, Some(Money::from_paise(-1)));
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_bill_totals() {
        // items 50×2 and 30×1, discount 10 ⇒ total 120
        let lines = vec![
            DraftLine {
                product_id: None,
                name: "Item A".to_string(),
                quantity: 2,
                unit_price: Money::from_rupees(50),
            },
            DraftLine {
                product_id: None,
                name: "Item B".to_string(),
                quantity: 1,
                unit_price: Money::from_rupees(30),
            },
        ];

        let totals = bill_totals(&lines, Money::from_rupees(10)).unwrap();
        assert_eq!(totals.subtotal, Money::from_rupees(130));
        assert_eq!(totals.total, Money::from_rupees(120));
    }

    #[test]
    fn test_bill_totals_rejects_oversized_discount() {
        let lines = vec![DraftLine {
            product_id: None,
            name: "Item".to_string(),
            quantity: 1,
            unit_price: Money::from_rupees(100),
        }];

        assert!(bill_totals(&lines, Money::from_rupees(101)).is_err());
        // Discount equal to subtotal is a free bill, not an error
        let free = bill_totals(&lines, Money::from_rupees(100)).unwrap();
        assert_eq!(free.total, Money::zero());
    }

    #[test]
    fn test_bill_totals_rejects_empty_and_bad_lines() {
        assert!(bill_totals(&[], Money::zero()).is_err());

        let bad_qty = vec![DraftLine {
            product_id: None,
            name: "Item".to_string(),
            quantity: 0,
            unit_price: Money::from_rupees(10),
        }];
        assert!(bill_totals(&bad_qty, Money::zero()).is_err());
    }

    #[test]
    fn test_bill_totals_rejects_amount_overflow() {
        use crate::error::ValidationError;

        let lines = vec![DraftLine {
            product_id: None,
            name: "Item".to_string(),
            quantity: 2,
            unit_price: Money::from_paise(i64::MAX),
        }];

        let err = bill_totals(&lines, Money::zero()).unwrap_err();
        assert!(matches!(err, ValidationError::Overflow { .. }));
    }

    #[test]
    fn test_credit_due_date() {
        let created = Utc::now();
        let due = credit_due_date(created);
        assert_eq!((due - created).num_days(), 30);
    }
}
