//! # Domain Types
//!
//! Core domain types used throughout Khata POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Ledger Entities                            │
//! │                                                                     │
//! │  ┌──────────────┐  ┌──────────────┐  ┌─────────────────────────┐    │
//! │  │   Product    │  │     Sale     │  │   Bill + BillItem       │    │
//! │  │  stock, unit │  │  paid+credit │  │  subtotal - discount    │    │
//! │  └──────────────┘  └──────────────┘  └─────────────────────────┘    │
//! │                                                                     │
//! │  ┌──────────────────────────┐  ┌──────────────────────────────┐     │
//! │  │ CustomerCredit           │  │ MarketCredit + Collection    │     │
//! │  │ + CreditTransaction log  │  │ outstanding = amount - Σcoll │     │
//! │  └──────────────────────────┘  └──────────────────────────────┘     │
//! │                                                                     │
//! │  CreditRequest (pending → approved | rejected, terminal)            │
//! │  PendingPayment (pending → partial → paid)                          │
//! │  StockAdjustment (increase | decrease | correction, audit row)      │
//! │  Order (placed → fulfilled | cancelled)                             │
//! │  User (customer | staff | owner)                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales and bills are immutable once written; the credit ledgers, pending
//! payments and requests are mutated in place by later staff/owner actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Enums
// =============================================================================

/// Unit of measure a product is stocked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum Unit {
    /// Litres (oils, liquids).
    L,
    /// Kilograms (grains, dry goods).
    Kg,
}

/// How a sale or bill was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// UPI transfer.
    Gpay,
    /// Full amount on the customer's tab.
    Credit,
}

impl PaymentMethod {
    /// Stable label used in report breakdowns and CSV cells.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Gpay => "gpay",
            PaymentMethod::Credit => "credit",
        }
    }
}

/// Settlement state of a bill, derived from its payment method.
/// `credit` ⇒ pending, everything else ⇒ paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum BillPaymentStatus {
    Paid,
    Pending,
}

impl BillPaymentStatus {
    /// Derives the status from the payment method.
    pub const fn from_method(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Credit => BillPaymentStatus::Pending,
            _ => BillPaymentStatus::Paid,
        }
    }
}

/// Direction of a customer-credit ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CreditTxKind {
    /// Increases the balance (a sale on credit).
    Debit,
    /// Decreases the balance (a payment).
    Credit,
}

/// Settlement state of a market credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum MarketCreditStatus {
    Unpaid,
    Paid,
}

/// Lifecycle of a customer credit request. Approved and rejected are
/// terminal: no further transition is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CreditRequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Settlement state of a pending payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PendingPaymentStatus {
    Pending,
    Partial,
    Paid,
}

/// What a pending payment was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PendingSourceKind {
    Sale,
    Bill,
}

/// Kind of manual stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    /// Restock: adds to stock.
    Increase,
    /// Shrinkage/damage: subtracts, guarded against going negative.
    Decrease,
    /// Physical count: sets an absolute value.
    Correction,
}

/// Lifecycle of a customer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Fulfilled,
    Cancelled,
}

/// User role, carried as a JWT claim and checked on every gated route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Staff,
    Owner,
}

impl Role {
    /// Staff-level access (staff and owner).
    pub const fn is_staff(&self) -> bool {
        matches!(self, Role::Staff | Role::Owner)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on receipts and dashboards.
    pub name: String,

    /// Explicit category ("oil", "rice", ...). Authoritative for the
    /// revenue-by-category report; never re-derived from the name.
    pub category: String,

    /// Sub-type within the category (e.g. "sunflower", "basmati").
    pub product_type: String,

    /// Retail packaging description ("1L pouch", "25KG bag").
    pub packaging: String,

    /// Base selling price in paise.
    pub base_price_paise: i64,

    /// Current stock in whole units of `unit`. Never negative; mutated only
    /// by sale recording, regular bill creation and explicit adjustments.
    pub stock: i64,

    /// Unit the stock is counted in.
    pub unit: Unit,

    /// Dashboard flags the product for reordering at or below this level.
    pub low_stock_alert: i64,

    /// Soft-delete flag.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the base price as Money.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_paise(self.base_price_paise)
    }

    /// Whether the product is at or below its reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_alert
    }

    /// Whether the requested quantity can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity > 0 && self.stock >= quantity
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One product sold to one customer at a point in time.
///
/// Invariant: `paid_paise + credit_paise == total_paise`, exactly.
/// Immutable once recorded; there is no edit path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub customer_name: String,
    pub customer_phone: String,
    /// Quantity sold, always a positive integer.
    pub quantity: i64,
    pub unit_price_paise: i64,
    /// quantity × unit price.
    pub total_paise: i64,
    /// Amount received at the counter.
    pub paid_paise: i64,
    /// Shortfall carried onto the customer's credit ledger.
    pub credit_paise: i64,
    pub payment_method: PaymentMethod,
    /// User id of the staff member who recorded the sale.
    pub recorded_by: String,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }

    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_paise(self.paid_paise)
    }

    #[inline]
    pub fn credit(&self) -> Money {
        Money::from_paise(self.credit_paise)
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A multi-line invoice. Regular bills reference products and decrement
/// stock; custom bills carry free-text lines and touch no stock.
///
/// `total = subtotal − discount`, with `0 ≤ discount ≤ subtotal` enforced
/// at creation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Bill {
    pub id: String,
    /// Human-readable bill number (date + sequence).
    pub bill_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub subtotal_paise: i64,
    pub discount_paise: i64,
    pub total_paise: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: BillPaymentStatus,
    /// True for custom (free-text) bills.
    pub is_custom: bool,
    /// Settlement deadline for credit bills (created_at + 30 days).
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }
}

/// A line on a bill. `product_id` is set only on regular bills.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BillItem {
    pub id: String,
    pub bill_id: String,
    pub product_id: Option<String>,
    /// Item name at time of billing (frozen).
    pub name: String,
    pub quantity: i64,
    pub unit_price_paise: i64,
    /// quantity × unit price.
    pub total_price_paise: i64,
}

// =============================================================================
// Customer Credit (per-phone running ledger)
// =============================================================================

/// Running credit balance for one customer, keyed by phone number.
///
/// The balance only grows through sales on credit; there is no payment
/// operation on this ledger. MarketCredit is the separately-managed,
/// collectible ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomerCredit {
    /// Customer phone number, the natural key.
    pub phone: String,
    pub customer_name: String,
    /// Running balance in paise.
    pub total_credit_paise: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An entry in a customer's append-only credit transaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CreditTransaction {
    pub id: String,
    pub customer_phone: String,
    pub kind: CreditTxKind,
    pub amount_paise: i64,
    pub description: String,
    /// Originating sale or order id, when there is one.
    pub reference_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Market Credit + Collections
// =============================================================================

/// A manually recorded, bazaar-style credit grant.
///
/// Invariant: `outstanding = amount − Σ collections`, never negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MarketCredit {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    /// Principal amount in paise.
    pub amount_paise: i64,
    /// Sum of recorded collections, denormalized for the conditional
    /// over-collection guard.
    pub collected_paise: i64,
    pub description: String,
    pub status: MarketCreditStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl MarketCredit {
    /// Outstanding balance: principal minus collections.
    #[inline]
    pub fn outstanding(&self) -> Money {
        Money::from_paise(self.amount_paise - self.collected_paise)
    }
}

/// A payment recorded against an outstanding market credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Collection {
    pub id: String,
    pub market_credit_id: String,
    pub amount_paise: i64,
    pub note: String,
    pub collected_by: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Credit Request
// =============================================================================

/// A customer-initiated ask for credit.
///
/// pending → approved | rejected, both terminal. Rejection requires a
/// non-empty reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CreditRequest {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub amount_paise: i64,
    pub reason: String,
    pub status: CreditRequestStatus,
    pub rejection_reason: Option<String>,
    /// User id of the approver/rejecter.
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Pending Payment
// =============================================================================

/// An amount still owed after a sale/bill where full payment was not
/// received at transaction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PendingPayment {
    pub id: String,
    pub source_kind: PendingSourceKind,
    /// Id of the originating sale or bill.
    pub source_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub total_paise: i64,
    pub paid_paise: i64,
    pub status: PendingPaymentStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PendingPayment {
    /// Amount still owed.
    #[inline]
    pub fn pending(&self) -> Money {
        Money::from_paise(self.total_paise - self.paid_paise)
    }
}

// =============================================================================
// Stock Adjustment
// =============================================================================

/// Audit row for a manual stock change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockAdjustment {
    pub id: String,
    pub product_id: String,
    pub kind: AdjustmentKind,
    /// Units added/removed, or the absolute value for a correction.
    pub quantity: i64,
    /// Stock level after the adjustment was applied.
    pub resulting_stock: i64,
    pub reason: String,
    pub adjusted_by: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// A customer order placed ahead of pickup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub product_id: String,
    /// Product name at time of ordering (frozen).
    pub product_name: String,
    pub quantity: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

/// An account in the identity store. The password is held only as an
/// argon2 hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_status_from_method() {
        assert_eq!(
            BillPaymentStatus::from_method(PaymentMethod::Credit),
            BillPaymentStatus::Pending
        );
        assert_eq!(
            BillPaymentStatus::from_method(PaymentMethod::Cash),
            BillPaymentStatus::Paid
        );
        assert_eq!(
            BillPaymentStatus::from_method(PaymentMethod::Gpay),
            BillPaymentStatus::Paid
        );
    }

    #[test]
    fn test_role_is_staff() {
        assert!(Role::Staff.is_staff());
        assert!(Role::Owner.is_staff());
        assert!(!Role::Customer.is_staff());
    }

    #[test]
    fn test_market_credit_outstanding() {
        let credit = MarketCredit {
            id: "mc-1".to_string(),
            customer_name: "Ravi".to_string(),
            customer_phone: "9876543210".to_string(),
            amount_paise: 100000,
            collected_paise: 50000,
            description: "monthly tab".to_string(),
            status: MarketCreditStatus::Unpaid,
            created_by: "owner".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(credit.outstanding().paise(), 50000);
    }

    #[test]
    fn test_pending_payment_pending() {
        let pp = PendingPayment {
            id: "pp-1".to_string(),
            source_kind: PendingSourceKind::Sale,
            source_id: "s-1".to_string(),
            customer_name: "Ravi".to_string(),
            customer_phone: "9876543210".to_string(),
            total_paise: 30000,
            paid_paise: 10000,
            status: PendingPaymentStatus::Partial,
            due_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(pp.pending().paise(), 20000);
    }

    #[test]
    fn test_product_low_stock() {
        let product = Product {
            id: "p-1".to_string(),
            name: "Sunflower Oil 1L".to_string(),
            category: "oil".to_string(),
            product_type: "sunflower".to_string(),
            packaging: "1L pouch".to_string(),
            base_price_paise: 14000,
            stock: 5,
            unit: Unit::L,
            low_stock_alert: 5,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.is_low_stock());
        assert!(product.can_sell(5));
        assert!(!product.can_sell(6));
        assert!(!product.can_sell(0));
    }
}
