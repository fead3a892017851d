//! # Transactional Ledger
//!
//! Every write that touches more than one row commits here, atomically.
//!
//! ## Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   One Transaction Per Operation                     │
//! │                                                                     │
//! │  record_sale ──► sales + products.stock + customer_credits          │
//! │                  + credit_transactions + pending_payments           │
//! │                                                                     │
//! │  create_bill ──► bills + bill_items + products.stock (regular)      │
//! │                  + pending_payments (credit bills)                  │
//! │                                                                     │
//! │  record_collection ──► collections + market_credits                 │
//! │  record_pending_payment ──► pending_payments (guarded instalment)   │
//! │  adjust_stock ──► products.stock + stock_adjustments                │
//! │  approve/reject request ──► credit_requests (one-shot transition)   │
//! │  fulfil_order ──► orders + products.stock                           │
//! │                                                                     │
//! │  Either every row lands or none do. Partial writes cannot happen.   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Stock never goes negative under concurrent sales. The decrement is
//! conditional:
//!
//! ```sql
//! UPDATE products SET stock = stock - ?1 WHERE id = ?2 AND stock >= ?1
//! ```
//!
//! `rows_affected == 0` means a concurrent write got there first; the
//! transaction rolls back and the caller sees `InsufficientStock`. The same
//! guarded-update shape protects collections (never exceed outstanding),
//! pending-payment instalments (never exceed what is owed) and the terminal
//! request/order transitions (decide exactly once).

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use khata_core::ledger::{bill_totals, credit_due_date, split_payment, DraftLine};
use khata_core::validation::{
    self, validate_phone, validate_quantity, validate_text, MAX_BILL_ITEMS,
};
use khata_core::{
    AdjustmentKind, Bill, BillItem, BillPaymentStatus, Collection, CoreError, CreditRequest,
    CreditRequestStatus, CreditTxKind, MarketCredit, MarketCreditStatus, Money, Order,
    OrderStatus, PaymentMethod, PendingPayment, PendingPaymentStatus, PendingSourceKind, Product,
    Sale, StockAdjustment, ValidationError,
};

const PRODUCT_COLUMNS: &str = "id, name, category, product_type, packaging, \
     base_price_paise, stock, unit, low_stock_alert, is_active, created_at, updated_at";

/// Maximum length for free-text fields written through the ledger.
const MAX_TEXT: usize = 200;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn request_status_label(status: CreditRequestStatus) -> &'static str {
    match status {
        CreditRequestStatus::Pending => "pending",
        CreditRequestStatus::Approved => "approved",
        CreditRequestStatus::Rejected => "rejected",
    }
}

fn order_status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Placed => "placed",
        OrderStatus::Fulfilled => "fulfilled",
        OrderStatus::Cancelled => "cancelled",
    }
}

// =============================================================================
// Drafts
// =============================================================================

/// Input for recording a sale.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    pub product_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub quantity: i64,
    /// Overrides the product's base price when set (counter bargaining).
    pub unit_price: Option<Money>,
    pub payment_method: PaymentMethod,
    /// Amount handed over; defaults to the full total for cash/gpay.
    pub paid: Option<Money>,
    pub recorded_by: String,
}

/// Input for creating a bill.
#[derive(Debug, Clone)]
pub struct BillDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub lines: Vec<DraftLine>,
    pub discount: Money,
    pub payment_method: PaymentMethod,
    /// Custom bills carry free-text lines and touch no stock.
    pub is_custom: bool,
    pub created_by: String,
}

/// Input for granting a market credit.
#[derive(Debug, Clone)]
pub struct MarketCreditDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub amount: Money,
    pub description: String,
    pub created_by: String,
}

/// Input for a customer credit request.
#[derive(Debug, Clone)]
pub struct CreditRequestDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub amount: Money,
    pub reason: String,
}

/// Input for placing a customer order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_phone: String,
    pub product_id: String,
    pub quantity: i64,
}

// =============================================================================
// Ledger
// =============================================================================

/// Transactional write operations over the whole ledger.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
}

impl Ledger {
    /// Creates a new Ledger over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Ledger { pool }
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Records a sale atomically.
    ///
    /// In one transaction: inserts the sale, decrements stock (guarded),
    /// grows the customer-credit ledger when part of the total went on
    /// credit, and opens a pending payment for the shortfall.
    ///
    /// ## Errors
    /// * `Domain(InsufficientStock)` - stock cannot cover the quantity
    /// * `Domain(Overpayment)` - explicit paid amount exceeds the total
    /// * `NotFound` - unknown or inactive product
    pub async fn record_sale(&self, draft: SaleDraft) -> DbResult<Sale> {
        let customer_name =
            validate_text("customerName", &draft.customer_name, MAX_TEXT).map_err(CoreError::from)?;
        let customer_phone = validate_phone(&draft.customer_phone).map_err(CoreError::from)?;
        validate_quantity(draft.quantity).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let product = fetch_active_product(&mut tx, &draft.product_id).await?;

        let unit_price = draft.unit_price.unwrap_or_else(|| product.base_price());
        validation::validate_non_negative_amount("unitPrice", unit_price.paise())
            .map_err(CoreError::from)?;

        let total = unit_price
            .checked_mul_quantity(draft.quantity)
            .ok_or_else(|| {
                CoreError::from(ValidationError::Overflow {
                    field: "total".to_string(),
                })
            })?;
        let split = split_payment(draft.payment_method, total, draft.paid)?;

        let now = Utc::now();
        let sale = Sale {
            id: new_id(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            customer_name,
            customer_phone,
            quantity: draft.quantity,
            unit_price_paise: unit_price.paise(),
            total_paise: total.paise(),
            paid_paise: split.paid.paise(),
            credit_paise: split.credit.paise(),
            payment_method: draft.payment_method,
            recorded_by: draft.recorded_by,
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO sales (id, product_id, product_name, customer_name, customer_phone, \
             quantity, unit_price_paise, total_paise, paid_paise, credit_paise, \
             payment_method, recorded_by, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .bind(&sale.id)
        .bind(&sale.product_id)
        .bind(&sale.product_name)
        .bind(&sale.customer_name)
        .bind(&sale.customer_phone)
        .bind(sale.quantity)
        .bind(sale.unit_price_paise)
        .bind(sale.total_paise)
        .bind(sale.paid_paise)
        .bind(sale.credit_paise)
        .bind(sale.payment_method)
        .bind(&sale.recorded_by)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        decrement_stock(&mut tx, &product, draft.quantity).await?;

        if split.credit.is_positive() {
            record_customer_credit(
                &mut tx,
                &sale.customer_phone,
                &sale.customer_name,
                split.credit,
                &format!("Sale: {} × {}", sale.quantity, sale.product_name),
                &sale.id,
            )
            .await?;

            let status = if split.paid.is_zero() {
                PendingPaymentStatus::Pending
            } else {
                PendingPaymentStatus::Partial
            };

            sqlx::query(
                "INSERT INTO pending_payments (id, source_kind, source_id, customer_name, \
                 customer_phone, total_paise, paid_paise, status, due_date, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )
            .bind(new_id())
            .bind(PendingSourceKind::Sale)
            .bind(&sale.id)
            .bind(&sale.customer_name)
            .bind(&sale.customer_phone)
            .bind(sale.total_paise)
            .bind(sale.paid_paise)
            .bind(status)
            .bind(Option::<chrono::DateTime<Utc>>::None)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            id = %sale.id,
            product = %sale.product_name,
            total_paise = sale.total_paise,
            credit_paise = sale.credit_paise,
            "Sale recorded"
        );
        Ok(sale)
    }

    // =========================================================================
    // Bills
    // =========================================================================

    /// Creates a bill atomically.
    ///
    /// Regular bills resolve each line against the catalog, freeze product
    /// names and decrement stock (guarded). Custom bills take the lines as
    /// given and touch no stock. Credit bills open a pending payment due 30
    /// days out.
    pub async fn create_bill(&self, draft: BillDraft) -> DbResult<(Bill, Vec<BillItem>)> {
        let customer_name =
            validate_text("customerName", &draft.customer_name, MAX_TEXT).map_err(CoreError::from)?;
        let customer_phone = validate_phone(&draft.customer_phone).map_err(CoreError::from)?;

        if draft.lines.len() > MAX_BILL_ITEMS {
            return Err(CoreError::from(ValidationError::OutOfRange {
                field: "items".to_string(),
                min: 1,
                max: MAX_BILL_ITEMS as i64,
            })
            .into());
        }

        let totals = bill_totals(&draft.lines, draft.discount).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let now = Utc::now();
        let payment_status = BillPaymentStatus::from_method(draft.payment_method);
        let due_date = match draft.payment_method {
            PaymentMethod::Credit => Some(credit_due_date(now)),
            _ => None,
        };

        // Date + per-day sequence, e.g. KB-20260830-0003
        let day_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|d| d.and_utc())
            .unwrap_or(now);
        let todays_bills: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bills WHERE created_at >= ?1")
                .bind(day_start)
                .fetch_one(&mut *tx)
                .await?;
        let bill_number = format!("KB-{}-{:04}", now.format("%Y%m%d"), todays_bills + 1);

        let bill = Bill {
            id: new_id(),
            bill_number,
            customer_name,
            customer_phone,
            subtotal_paise: totals.subtotal.paise(),
            discount_paise: totals.discount.paise(),
            total_paise: totals.total.paise(),
            payment_method: draft.payment_method,
            payment_status,
            is_custom: draft.is_custom,
            due_date,
            created_by: draft.created_by,
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO bills (id, bill_number, customer_name, customer_phone, subtotal_paise, \
             discount_paise, total_paise, payment_method, payment_status, is_custom, due_date, \
             created_by, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .bind(&bill.id)
        .bind(&bill.bill_number)
        .bind(&bill.customer_name)
        .bind(&bill.customer_phone)
        .bind(bill.subtotal_paise)
        .bind(bill.discount_paise)
        .bind(bill.total_paise)
        .bind(bill.payment_method)
        .bind(bill.payment_status)
        .bind(bill.is_custom)
        .bind(bill.due_date)
        .bind(&bill.created_by)
        .bind(bill.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let item = if draft.is_custom {
                let name = validate_text("itemName", &line.name, MAX_TEXT).map_err(CoreError::from)?;
                BillItem {
                    id: new_id(),
                    bill_id: bill.id.clone(),
                    product_id: None,
                    name,
                    quantity: line.quantity,
                    unit_price_paise: line.unit_price.paise(),
                    total_price_paise: line.line_total().map_err(CoreError::from)?.paise(),
                }
            } else {
                let product_id = line.product_id.as_deref().ok_or_else(|| {
                    DbError::Domain(CoreError::from(ValidationError::Required {
                        field: "items.productId".to_string(),
                    }))
                })?;

                let product = fetch_active_product(&mut tx, product_id).await?;
                decrement_stock(&mut tx, &product, line.quantity).await?;

                BillItem {
                    id: new_id(),
                    bill_id: bill.id.clone(),
                    product_id: Some(product.id.clone()),
                    name: product.name,
                    quantity: line.quantity,
                    unit_price_paise: line.unit_price.paise(),
                    total_price_paise: line.line_total().map_err(CoreError::from)?.paise(),
                }
            };

            sqlx::query(
                "INSERT INTO bill_items (id, bill_id, product_id, name, quantity, \
                 unit_price_paise, total_price_paise) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&item.id)
            .bind(&item.bill_id)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.unit_price_paise)
            .bind(item.total_price_paise)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        if bill.payment_method == PaymentMethod::Credit {
            sqlx::query(
                "INSERT INTO pending_payments (id, source_kind, source_id, customer_name, \
                 customer_phone, total_paise, paid_paise, status, due_date, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9, ?10)",
            )
            .bind(new_id())
            .bind(PendingSourceKind::Bill)
            .bind(&bill.id)
            .bind(&bill.customer_name)
            .bind(&bill.customer_phone)
            .bind(bill.total_paise)
            .bind(PendingPaymentStatus::Pending)
            .bind(bill.due_date)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            id = %bill.id,
            bill_number = %bill.bill_number,
            total_paise = bill.total_paise,
            items = items.len(),
            "Bill created"
        );
        Ok((bill, items))
    }

    // =========================================================================
    // Market Credits + Collections
    // =========================================================================

    /// Grants a market credit (single row, nothing collected yet).
    pub async fn create_market_credit(&self, draft: MarketCreditDraft) -> DbResult<MarketCredit> {
        let customer_name =
            validate_text("customerName", &draft.customer_name, MAX_TEXT).map_err(CoreError::from)?;
        let customer_phone = validate_phone(&draft.customer_phone).map_err(CoreError::from)?;
        let description =
            validate_text("description", &draft.description, MAX_TEXT).map_err(CoreError::from)?;
        validation::validate_positive_amount("amount", draft.amount.paise())
            .map_err(CoreError::from)?;

        let credit = MarketCredit {
            id: new_id(),
            customer_name,
            customer_phone,
            amount_paise: draft.amount.paise(),
            collected_paise: 0,
            description,
            status: MarketCreditStatus::Unpaid,
            created_by: draft.created_by,
            created_at: Utc::now(),
        };

        crate::repository::market_credit::MarketCreditRepository::new(self.pool.clone())
            .insert(&credit)
            .await?;

        info!(id = %credit.id, amount_paise = credit.amount_paise, "Market credit granted");
        Ok(credit)
    }

    /// Records a collection against a market credit.
    ///
    /// Guarded so the outstanding balance never goes below zero; when the
    /// collection settles the full amount the credit flips to paid, in the
    /// same transaction.
    pub async fn record_collection(
        &self,
        market_credit_id: &str,
        amount: Money,
        note: &str,
        collected_by: &str,
    ) -> DbResult<Collection> {
        validation::validate_positive_amount("amount", amount.paise()).map_err(CoreError::from)?;
        let note = validate_text("note", note, MAX_TEXT).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let credit = sqlx::query_as::<_, MarketCredit>(
            "SELECT id, customer_name, customer_phone, amount_paise, collected_paise, \
             description, status, created_by, created_at \
             FROM market_credits WHERE id = ?1",
        )
        .bind(market_credit_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("MarketCredit", market_credit_id))?;

        let outstanding = credit.amount_paise - credit.collected_paise;
        if amount.paise() > outstanding {
            return Err(CoreError::OverCollection {
                amount: amount.paise(),
                outstanding,
            }
            .into());
        }

        let result = sqlx::query(
            "UPDATE market_credits SET \
             collected_paise = collected_paise + ?1, \
             status = CASE WHEN collected_paise + ?1 >= amount_paise THEN 'paid' ELSE status END \
             WHERE id = ?2 AND collected_paise + ?1 <= amount_paise",
        )
        .bind(amount.paise())
        .bind(market_credit_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::TransactionFailed(
                "collection lost a concurrent update".to_string(),
            ));
        }

        let collection = Collection {
            id: new_id(),
            market_credit_id: market_credit_id.to_string(),
            amount_paise: amount.paise(),
            note,
            collected_by: collected_by.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO collections (id, market_credit_id, amount_paise, note, collected_by, \
             created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&collection.id)
        .bind(&collection.market_credit_id)
        .bind(collection.amount_paise)
        .bind(&collection.note)
        .bind(&collection.collected_by)
        .bind(collection.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            market_credit_id = %market_credit_id,
            amount_paise = collection.amount_paise,
            "Collection recorded"
        );
        Ok(collection)
    }

    // =========================================================================
    // Credit Requests
    // =========================================================================

    /// Files a customer credit request (status starts pending).
    pub async fn create_credit_request(&self, draft: CreditRequestDraft) -> DbResult<CreditRequest> {
        let customer_name =
            validate_text("customerName", &draft.customer_name, MAX_TEXT).map_err(CoreError::from)?;
        let customer_phone = validate_phone(&draft.customer_phone).map_err(CoreError::from)?;
        let reason = validate_text("reason", &draft.reason, MAX_TEXT).map_err(CoreError::from)?;
        validation::validate_positive_amount("amount", draft.amount.paise())
            .map_err(CoreError::from)?;

        let request = CreditRequest {
            id: new_id(),
            customer_name,
            customer_phone,
            amount_paise: draft.amount.paise(),
            reason,
            status: CreditRequestStatus::Pending,
            rejection_reason: None,
            decided_by: None,
            decided_at: None,
            created_at: Utc::now(),
        };

        crate::repository::credit_request::CreditRequestRepository::new(self.pool.clone())
            .insert(&request)
            .await?;

        info!(id = %request.id, amount_paise = request.amount_paise, "Credit request filed");
        Ok(request)
    }

    /// Approves a pending credit request. Terminal: a decided request
    /// cannot be decided again.
    pub async fn approve_credit_request(
        &self,
        id: &str,
        decided_by: &str,
    ) -> DbResult<CreditRequest> {
        self.decide_credit_request(id, decided_by, CreditRequestStatus::Approved, None)
            .await
    }

    /// Rejects a pending credit request with a mandatory reason.
    pub async fn reject_credit_request(
        &self,
        id: &str,
        decided_by: &str,
        reason: &str,
    ) -> DbResult<CreditRequest> {
        let reason = validate_text("rejectionReason", reason, MAX_TEXT).map_err(CoreError::from)?;
        self.decide_credit_request(id, decided_by, CreditRequestStatus::Rejected, Some(reason))
            .await
    }

    async fn decide_credit_request(
        &self,
        id: &str,
        decided_by: &str,
        status: CreditRequestStatus,
        rejection_reason: Option<String>,
    ) -> DbResult<CreditRequest> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // One-shot transition: the WHERE clause only matches pending rows,
        // so a second decision affects zero rows.
        let result = sqlx::query(
            "UPDATE credit_requests SET \
             status = ?2, rejection_reason = ?3, decided_by = ?4, decided_at = ?5 \
             WHERE id = ?1 AND status = 'pending'",
        )
        .bind(id)
        .bind(status)
        .bind(&rejection_reason)
        .bind(decided_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let existing = sqlx::query_as::<_, CreditRequest>(
                "SELECT id, customer_name, customer_phone, amount_paise, reason, status, \
                 rejection_reason, decided_by, decided_at, created_at \
                 FROM credit_requests WHERE id = ?1",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

            return match existing {
                None => Err(DbError::not_found("CreditRequest", id)),
                Some(request) => Err(CoreError::RequestAlreadyDecided {
                    id: id.to_string(),
                    status: request_status_label(request.status).to_string(),
                }
                .into()),
            };
        }

        let request = sqlx::query_as::<_, CreditRequest>(
            "SELECT id, customer_name, customer_phone, amount_paise, reason, status, \
             rejection_reason, decided_by, decided_at, created_at \
             FROM credit_requests WHERE id = ?1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %id, status = request_status_label(request.status), "Credit request decided");
        Ok(request)
    }

    // =========================================================================
    // Pending Payments
    // =========================================================================

    /// Records an instalment against a pending payment.
    ///
    /// The paid amount climbs towards the total; reaching it flips the
    /// status to paid. Paying more than what is owed is rejected.
    pub async fn record_pending_payment(&self, id: &str, amount: Money) -> DbResult<PendingPayment> {
        validation::validate_positive_amount("amount", amount.paise()).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let payment = sqlx::query_as::<_, PendingPayment>(
            "SELECT id, source_kind, source_id, customer_name, customer_phone, total_paise, \
             paid_paise, status, due_date, created_at, updated_at \
             FROM pending_payments WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("PendingPayment", id))?;

        let pending = payment.total_paise - payment.paid_paise;
        if amount.paise() > pending {
            return Err(CoreError::PendingOverpayment {
                amount: amount.paise(),
                pending,
            }
            .into());
        }

        let new_paid = payment.paid_paise + amount.paise();
        let new_status = if new_paid >= payment.total_paise {
            PendingPaymentStatus::Paid
        } else {
            PendingPaymentStatus::Partial
        };
        let now = Utc::now();

        // Optimistic guard on the previously read paid amount
        let result = sqlx::query(
            "UPDATE pending_payments SET paid_paise = ?2, status = ?3, updated_at = ?4 \
             WHERE id = ?1 AND paid_paise = ?5",
        )
        .bind(id)
        .bind(new_paid)
        .bind(new_status)
        .bind(now)
        .bind(payment.paid_paise)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::TransactionFailed(
                "pending payment lost a concurrent update".to_string(),
            ));
        }

        tx.commit().await?;

        info!(id = %id, amount_paise = amount.paise(), "Pending payment instalment recorded");
        Ok(PendingPayment {
            paid_paise: new_paid,
            status: new_status,
            updated_at: now,
            ..payment
        })
    }

    // =========================================================================
    // Stock Adjustments
    // =========================================================================

    /// Applies a manual stock adjustment and writes its audit row.
    ///
    /// * `Increase` adds `quantity` units
    /// * `Decrease` removes them, guarded against going negative
    /// * `Correction` sets the absolute level (physical count)
    pub async fn adjust_stock(
        &self,
        product_id: &str,
        kind: AdjustmentKind,
        quantity: i64,
        reason: &str,
        adjusted_by: &str,
    ) -> DbResult<StockAdjustment> {
        let reason = validate_text("reason", reason, MAX_TEXT).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;
        let product = fetch_active_product(&mut tx, product_id).await?;
        let now = Utc::now();

        match kind {
            AdjustmentKind::Increase => {
                validate_quantity(quantity).map_err(CoreError::from)?;
                sqlx::query(
                    "UPDATE products SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3",
                )
                .bind(quantity)
                .bind(now)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
            }
            AdjustmentKind::Decrease => {
                validate_quantity(quantity).map_err(CoreError::from)?;
                decrement_stock(&mut tx, &product, quantity).await?;
            }
            AdjustmentKind::Correction => {
                if quantity < 0 {
                    return Err(CoreError::from(ValidationError::MustBeNonNegative {
                        field: "quantity".to_string(),
                    })
                    .into());
                }
                sqlx::query("UPDATE products SET stock = ?1, updated_at = ?2 WHERE id = ?3")
                    .bind(quantity)
                    .bind(now)
                    .bind(product_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let resulting_stock: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await?;

        let adjustment = StockAdjustment {
            id: new_id(),
            product_id: product_id.to_string(),
            kind,
            quantity,
            resulting_stock,
            reason,
            adjusted_by: adjusted_by.to_string(),
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO stock_adjustments (id, product_id, kind, quantity, resulting_stock, \
             reason, adjusted_by, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&adjustment.id)
        .bind(&adjustment.product_id)
        .bind(adjustment.kind)
        .bind(adjustment.quantity)
        .bind(adjustment.resulting_stock)
        .bind(&adjustment.reason)
        .bind(&adjustment.adjusted_by)
        .bind(adjustment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            product = %product.name,
            resulting_stock,
            "Stock adjusted"
        );
        Ok(adjustment)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Places a customer order, freezing the product name.
    pub async fn place_order(&self, draft: OrderDraft) -> DbResult<Order> {
        let customer_name =
            validate_text("customerName", &draft.customer_name, MAX_TEXT).map_err(CoreError::from)?;
        let customer_phone = validate_phone(&draft.customer_phone).map_err(CoreError::from)?;
        validate_quantity(draft.quantity).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;
        let product = fetch_active_product(&mut tx, &draft.product_id).await?;
        let now = Utc::now();

        let order = Order {
            id: new_id(),
            customer_name,
            customer_phone,
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity: draft.quantity,
            status: OrderStatus::Placed,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO orders (id, customer_name, customer_phone, product_id, product_name, \
             quantity, status, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&order.id)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.product_id)
        .bind(&order.product_name)
        .bind(order.quantity)
        .bind(order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %order.id, product = %order.product_name, "Order placed");
        Ok(order)
    }

    /// Fulfils a placed order, consuming stock in the same transaction.
    pub async fn fulfil_order(&self, id: &str) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let order = fetch_order(&mut tx, id).await?;
        if order.status != OrderStatus::Placed {
            return Err(CoreError::InvalidOrderStatus {
                id: id.to_string(),
                status: order_status_label(order.status).to_string(),
            }
            .into());
        }

        let product = fetch_active_product(&mut tx, &order.product_id).await?;
        decrement_stock(&mut tx, &product, order.quantity).await?;

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE orders SET status = 'fulfilled', updated_at = ?2 \
             WHERE id = ?1 AND status = 'placed'",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::TransactionFailed(
                "order lost a concurrent update".to_string(),
            ));
        }

        tx.commit().await?;

        info!(id = %id, "Order fulfilled");
        Ok(Order {
            status: OrderStatus::Fulfilled,
            updated_at: now,
            ..order
        })
    }

    /// Cancels a placed order. Fulfilled and cancelled orders stay as
    /// they are.
    pub async fn cancel_order(&self, id: &str) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE orders SET status = 'cancelled', updated_at = ?2 \
             WHERE id = ?1 AND status = 'placed'",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let existing = fetch_order(&mut tx, id).await?;
            return Err(CoreError::InvalidOrderStatus {
                id: id.to_string(),
                status: order_status_label(existing.status).to_string(),
            }
            .into());
        }

        let order = fetch_order(&mut tx, id).await?;
        tx.commit().await?;

        info!(id = %id, "Order cancelled");
        Ok(order)
    }
}

// =============================================================================
// Shared transaction helpers
// =============================================================================

async fn fetch_active_product(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
) -> DbResult<Product> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND is_active = 1");

    sqlx::query_as::<_, Product>(&sql)
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", product_id))
}

async fn fetch_order(tx: &mut Transaction<'_, Sqlite>, id: &str) -> DbResult<Order> {
    sqlx::query_as::<_, Order>(
        "SELECT id, customer_name, customer_phone, product_id, product_name, quantity, status, \
         created_at, updated_at FROM orders WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| DbError::not_found("Order", id))
}

/// Conditional stock decrement. Zero affected rows means the stock read at
/// the start of the transaction no longer covers the quantity.
async fn decrement_stock(
    tx: &mut Transaction<'_, Sqlite>,
    product: &Product,
    quantity: i64,
) -> DbResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        "UPDATE products SET stock = stock - ?1, updated_at = ?2 \
         WHERE id = ?3 AND stock >= ?1",
    )
    .bind(quantity)
    .bind(now)
    .bind(&product.id)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        debug!(product = %product.name, requested = quantity, "Stock decrement refused");
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.stock,
            requested: quantity,
        }
        .into());
    }

    Ok(())
}

/// Grows the customer's running credit balance and appends a ledger entry.
/// Creates the credit record on first use of the phone number.
async fn record_customer_credit(
    tx: &mut Transaction<'_, Sqlite>,
    phone: &str,
    customer_name: &str,
    amount: Money,
    description: &str,
    reference_id: &str,
) -> DbResult<()> {
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO customer_credits (phone, customer_name, total_credit_paise, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?4) \
         ON CONFLICT(phone) DO UPDATE SET \
         total_credit_paise = total_credit_paise + excluded.total_credit_paise, \
         customer_name = excluded.customer_name, \
         updated_at = excluded.updated_at",
    )
    .bind(phone)
    .bind(customer_name)
    .bind(amount.paise())
    .bind(now)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "INSERT INTO credit_transactions (id, customer_phone, kind, amount_paise, description, \
         reference_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(new_id())
    .bind(phone)
    .bind(CreditTxKind::Debit)
    .bind(amount.paise())
    .bind(description)
    .bind(reference_id)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use khata_core::Unit;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, name: &str, price_rupees: i64, stock: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: new_id(),
            name: name.to_string(),
            category: "oil".to_string(),
            product_type: "sunflower".to_string(),
            packaging: "1L pouch".to_string(),
            base_price_paise: Money::from_rupees(price_rupees).paise(),
            stock,
            unit: Unit::L,
            low_stock_alert: 5,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    fn sale_draft(product: &Product, quantity: i64, method: PaymentMethod) -> SaleDraft {
        SaleDraft {
            product_id: product.id.clone(),
            customer_name: "Ravi".to_string(),
            customer_phone: "9876543210".to_string(),
            quantity,
            unit_price: None,
            payment_method: method,
            paid: None,
            recorded_by: "staff-1".to_string(),
        }
    }

    // === Sales ===============================================================

    #[tokio::test]
    async fn test_record_sale_cash() {
        let db = test_db().await;
        let product = seed_product(&db, "Sunflower Oil 1L", 100, 10).await;

        let sale = db
            .ledger()
            .record_sale(sale_draft(&product, 3, PaymentMethod::Cash))
            .await
            .unwrap();

        assert_eq!(sale.total_paise, 30000);
        assert_eq!(sale.paid_paise, 30000);
        assert_eq!(sale.credit_paise, 0);

        let product = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(product.stock, 7);

        // fully paid: no credit ledger entry, no pending payment
        assert!(db.credits().get_by_phone("9876543210").await.unwrap().is_none());
        assert!(db.pending_payments().list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_sale_on_credit() {
        let db = test_db().await;
        let product = seed_product(&db, "Basmati Rice 25KG", 100, 10).await;

        let sale = db
            .ledger()
            .record_sale(sale_draft(&product, 5, PaymentMethod::Credit))
            .await
            .unwrap();

        assert_eq!(sale.paid_paise, 0);
        assert_eq!(sale.credit_paise, 50000);

        let credit = db
            .credits()
            .get_by_phone("9876543210")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credit.total_credit_paise, 50000);

        let transactions = db.credits().transactions_for("9876543210").await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].kind, CreditTxKind::Debit);
        assert_eq!(transactions[0].reference_id.as_deref(), Some(sale.id.as_str()));

        let payments = db.pending_payments().list(None).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].status, PendingPaymentStatus::Pending);
        assert_eq!(payments[0].pending().paise(), 50000);
        assert_eq!(payments[0].source_kind, PendingSourceKind::Sale);
    }

    #[tokio::test]
    async fn test_record_sale_partial_payment() {
        let db = test_db().await;
        let product = seed_product(&db, "Sunflower Oil 1L", 100, 10).await;

        let mut draft = sale_draft(&product, 5, PaymentMethod::Gpay);
        draft.paid = Some(Money::from_rupees(200));

        let sale = db.ledger().record_sale(draft).await.unwrap();
        assert_eq!(sale.paid_paise, 20000);
        assert_eq!(sale.credit_paise, 30000);
        assert_eq!(sale.paid_paise + sale.credit_paise, sale.total_paise);

        let credit = db
            .credits()
            .get_by_phone("9876543210")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credit.total_credit_paise, 30000);

        let payments = db.pending_payments().list(None).await.unwrap();
        assert_eq!(payments[0].status, PendingPaymentStatus::Partial);
        assert_eq!(payments[0].pending().paise(), 30000);
    }

    #[tokio::test]
    async fn test_record_sale_insufficient_stock_rolls_back() {
        let db = test_db().await;
        let product = seed_product(&db, "Sunflower Oil 1L", 100, 2).await;

        let err = db
            .ledger()
            .record_sale(sale_draft(&product, 3, PaymentMethod::Cash))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 2, requested: 3, .. })
        ));

        // nothing written
        let product = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(product.stock, 2);
        assert!(db.sales().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_sale_rejects_overpayment() {
        let db = test_db().await;
        let product = seed_product(&db, "Sunflower Oil 1L", 100, 10).await;

        let mut draft = sale_draft(&product, 1, PaymentMethod::Cash);
        draft.paid = Some(Money::from_rupees(150));

        let err = db.ledger().record_sale(draft).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Overpayment { .. })));
    }

    #[tokio::test]
    async fn test_record_sale_rejects_amount_overflow() {
        let db = test_db().await;
        let product = seed_product(&db, "Sunflower Oil 1L", 100, 10).await;

        let mut draft = sale_draft(&product, 3, PaymentMethod::Cash);
        draft.unit_price = Some(Money::from_paise(i64::MAX));

        let err = db.ledger().record_sale(draft).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Overflow { .. }))
        ));
    }

    // === Bills ===============================================================

    #[tokio::test]
    async fn test_create_regular_bill() {
        let db = test_db().await;
        let oil = seed_product(&db, "Sunflower Oil 1L", 50, 10).await;
        let rice = seed_product(&db, "Basmati Rice 1KG", 30, 10).await;

        let draft = BillDraft {
            customer_name: "Ravi".to_string(),
            customer_phone: "9876543210".to_string(),
            lines: vec![
                DraftLine {
                    product_id: Some(oil.id.clone()),
                    name: String::new(),
                    quantity: 2,
                    unit_price: Money::from_rupees(50),
                },
                DraftLine {
                    product_id: Some(rice.id.clone()),
                    name: String::new(),
                    quantity: 1,
                    unit_price: Money::from_rupees(30),
                },
            ],
            discount: Money::from_rupees(10),
            payment_method: PaymentMethod::Cash,
            is_custom: false,
            created_by: "staff-1".to_string(),
        };

        let (bill, items) = db.ledger().create_bill(draft).await.unwrap();

        assert_eq!(bill.subtotal_paise, 13000);
        assert_eq!(bill.total_paise, 12000);
        assert_eq!(bill.payment_status, BillPaymentStatus::Paid);
        assert!(bill.bill_number.starts_with("KB-"));
        assert_eq!(items.len(), 2);
        // names frozen from the catalog
        assert_eq!(items[0].name, "Sunflower Oil 1L");

        let oil = db.products().get_by_id(&oil.id).await.unwrap().unwrap();
        let rice = db.products().get_by_id(&rice.id).await.unwrap().unwrap();
        assert_eq!(oil.stock, 8);
        assert_eq!(rice.stock, 9);
    }

    #[tokio::test]
    async fn test_create_custom_bill_touches_no_stock() {
        let db = test_db().await;
        let product = seed_product(&db, "Sunflower Oil 1L", 50, 10).await;

        let draft = BillDraft {
            customer_name: "Ravi".to_string(),
            customer_phone: "9876543210".to_string(),
            lines: vec![DraftLine {
                product_id: None,
                name: "Loose jaggery".to_string(),
                quantity: 2,
                unit_price: Money::from_rupees(40),
            }],
            discount: Money::zero(),
            payment_method: PaymentMethod::Gpay,
            is_custom: true,
            created_by: "staff-1".to_string(),
        };

        let (bill, items) = db.ledger().create_bill(draft).await.unwrap();
        assert_eq!(bill.total_paise, 8000);
        assert!(items[0].product_id.is_none());

        let product = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(product.stock, 10);
    }

    #[tokio::test]
    async fn test_create_credit_bill_opens_pending_payment() {
        let db = test_db().await;
        let product = seed_product(&db, "Sunflower Oil 1L", 50, 10).await;

        let draft = BillDraft {
            customer_name: "Ravi".to_string(),
            customer_phone: "9876543210".to_string(),
            lines: vec![DraftLine {
                product_id: Some(product.id.clone()),
                name: String::new(),
                quantity: 1,
                unit_price: Money::from_rupees(50),
            }],
            discount: Money::zero(),
            payment_method: PaymentMethod::Credit,
            is_custom: false,
            created_by: "staff-1".to_string(),
        };

        let (bill, _) = db.ledger().create_bill(draft).await.unwrap();
        assert_eq!(bill.payment_status, BillPaymentStatus::Pending);
        let due = bill.due_date.unwrap();
        assert_eq!((due - bill.created_at).num_days(), 30);

        let payments = db.pending_payments().list(None).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].source_kind, PendingSourceKind::Bill);
        assert_eq!(payments[0].total_paise, 5000);
        assert!(payments[0].due_date.is_some());
    }

    #[tokio::test]
    async fn test_create_bill_rejects_oversized_discount() {
        let db = test_db().await;

        let draft = BillDraft {
            customer_name: "Ravi".to_string(),
            customer_phone: "9876543210".to_string(),
            lines: vec![DraftLine {
                product_id: None,
                name: "Item".to_string(),
                quantity: 1,
                unit_price: Money::from_rupees(100),
            }],
            discount: Money::from_rupees(101),
            payment_method: PaymentMethod::Cash,
            is_custom: true,
            created_by: "staff-1".to_string(),
        };

        let err = db.ledger().create_bill(draft).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(
                ValidationError::DiscountExceedsSubtotal { .. }
            ))
        ));
    }

    // === Market credits + collections ========================================

    async fn seed_market_credit(db: &Database, rupees: i64) -> MarketCredit {
        db.ledger()
            .create_market_credit(MarketCreditDraft {
                customer_name: "Ravi".to_string(),
                customer_phone: "9876543210".to_string(),
                amount: Money::from_rupees(rupees),
                description: "monthly tab".to_string(),
                created_by: "owner-1".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_collection_reduces_outstanding() {
        let db = test_db().await;
        let credit = seed_market_credit(&db, 1000).await;

        db.ledger()
            .record_collection(&credit.id, Money::from_rupees(400), "first visit", "staff-1")
            .await
            .unwrap();

        let credit = db
            .market_credits()
            .get_by_id(&credit.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credit.collected_paise, 40000);
        assert_eq!(credit.outstanding().paise(), 60000);
        assert_eq!(credit.status, MarketCreditStatus::Unpaid);
    }

    #[tokio::test]
    async fn test_full_collection_flips_status_to_paid() {
        let db = test_db().await;
        let credit = seed_market_credit(&db, 1000).await;

        db.ledger()
            .record_collection(&credit.id, Money::from_rupees(1000), "settled", "staff-1")
            .await
            .unwrap();

        let credit = db
            .market_credits()
            .get_by_id(&credit.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credit.status, MarketCreditStatus::Paid);
        assert_eq!(credit.outstanding().paise(), 0);
    }

    #[tokio::test]
    async fn test_over_collection_rejected() {
        let db = test_db().await;
        let credit = seed_market_credit(&db, 1000).await;

        db.ledger()
            .record_collection(&credit.id, Money::from_rupees(900), "almost", "staff-1")
            .await
            .unwrap();

        let err = db
            .ledger()
            .record_collection(&credit.id, Money::from_rupees(200), "too much", "staff-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::OverCollection { amount: 20000, outstanding: 10000 })
        ));

        // the refused collection left no row
        let collections = db.market_credits().collections_for(&credit.id).await.unwrap();
        assert_eq!(collections.len(), 1);
    }

    // === Credit requests =====================================================

    #[tokio::test]
    async fn test_credit_request_decided_once() {
        let db = test_db().await;

        let request = db
            .ledger()
            .create_credit_request(CreditRequestDraft {
                customer_name: "Ravi".to_string(),
                customer_phone: "9876543210".to_string(),
                amount: Money::from_rupees(500),
                reason: "festival stock".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(request.status, CreditRequestStatus::Pending);

        let approved = db
            .ledger()
            .approve_credit_request(&request.id, "owner-1")
            .await
            .unwrap();
        assert_eq!(approved.status, CreditRequestStatus::Approved);
        assert_eq!(approved.decided_by.as_deref(), Some("owner-1"));
        assert!(approved.decided_at.is_some());

        // second decision is refused
        let err = db
            .ledger()
            .reject_credit_request(&request.id, "owner-1", "changed my mind")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::RequestAlreadyDecided { .. })
        ));
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let db = test_db().await;

        let request = db
            .ledger()
            .create_credit_request(CreditRequestDraft {
                customer_name: "Ravi".to_string(),
                customer_phone: "9876543210".to_string(),
                amount: Money::from_rupees(500),
                reason: "festival stock".to_string(),
            })
            .await
            .unwrap();

        let err = db
            .ledger()
            .reject_credit_request(&request.id, "owner-1", "   ")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let rejected = db
            .ledger()
            .reject_credit_request(&request.id, "owner-1", "balance too high")
            .await
            .unwrap();
        assert_eq!(rejected.status, CreditRequestStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("balance too high"));
    }

    // === Pending payments ====================================================

    #[tokio::test]
    async fn test_pending_payment_instalments() {
        let db = test_db().await;
        let product = seed_product(&db, "Sunflower Oil 1L", 100, 10).await;

        db.ledger()
            .record_sale(sale_draft(&product, 5, PaymentMethod::Credit))
            .await
            .unwrap();
        let payment = db.pending_payments().list(None).await.unwrap().remove(0);

        let payment = db
            .ledger()
            .record_pending_payment(&payment.id, Money::from_rupees(200))
            .await
            .unwrap();
        assert_eq!(payment.status, PendingPaymentStatus::Partial);
        assert_eq!(payment.pending().paise(), 30000);

        let err = db
            .ledger()
            .record_pending_payment(&payment.id, Money::from_rupees(400))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::PendingOverpayment { amount: 40000, pending: 30000 })
        ));

        let payment = db
            .ledger()
            .record_pending_payment(&payment.id, Money::from_rupees(300))
            .await
            .unwrap();
        assert_eq!(payment.status, PendingPaymentStatus::Paid);
        assert_eq!(payment.pending().paise(), 0);
    }

    // === Stock adjustments ===================================================

    #[tokio::test]
    async fn test_adjust_stock_kinds() {
        let db = test_db().await;
        let product = seed_product(&db, "Sunflower Oil 1L", 100, 10).await;
        let ledger = db.ledger();

        let adj = ledger
            .adjust_stock(&product.id, AdjustmentKind::Increase, 5, "restock", "owner-1")
            .await
            .unwrap();
        assert_eq!(adj.resulting_stock, 15);

        let adj = ledger
            .adjust_stock(&product.id, AdjustmentKind::Decrease, 3, "damaged pouches", "owner-1")
            .await
            .unwrap();
        assert_eq!(adj.resulting_stock, 12);

        let adj = ledger
            .adjust_stock(&product.id, AdjustmentKind::Correction, 20, "physical count", "owner-1")
            .await
            .unwrap();
        assert_eq!(adj.resulting_stock, 20);

        let err = ledger
            .adjust_stock(&product.id, AdjustmentKind::Decrease, 21, "oops", "owner-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { .. })
        ));

        let trail = db.products().adjustments_for(&product.id).await.unwrap();
        assert_eq!(trail.len(), 3);
    }

    // === Orders ==============================================================

    #[tokio::test]
    async fn test_order_lifecycle() {
        let db = test_db().await;
        let product = seed_product(&db, "Basmati Rice 25KG", 100, 10).await;
        let ledger = db.ledger();

        let order = ledger
            .place_order(OrderDraft {
                customer_name: "Ravi".to_string(),
                customer_phone: "9876543210".to_string(),
                product_id: product.id.clone(),
                quantity: 4,
            })
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.product_name, "Basmati Rice 25KG");

        let order = ledger.fulfil_order(&order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Fulfilled);

        let product = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(product.stock, 6);

        // fulfilled orders cannot be cancelled
        let err = ledger.cancel_order(&order.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidOrderStatus { .. })
        ));
    }

    #[tokio::test]
    async fn test_fulfil_order_needs_stock() {
        let db = test_db().await;
        let product = seed_product(&db, "Basmati Rice 25KG", 100, 3).await;
        let ledger = db.ledger();

        let order = ledger
            .place_order(OrderDraft {
                customer_name: "Ravi".to_string(),
                customer_phone: "9876543210".to_string(),
                product_id: product.id.clone(),
                quantity: 4,
            })
            .await
            .unwrap();

        let err = ledger.fulfil_order(&order.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { .. })
        ));

        // order stays placed, stock untouched
        let order = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Placed);
    }
}
