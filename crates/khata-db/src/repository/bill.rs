//! # Bill Repository
//!
//! Read-side queries over bills and their items. Bill creation is
//! transactional (items + stock + pending payment) and lives in the ledger.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use khata_core::{Bill, BillItem};

const BILL_COLUMNS: &str = "id, bill_number, customer_name, customer_phone, \
     subtotal_paise, discount_paise, total_paise, payment_method, payment_status, \
     is_custom, due_date, created_by, created_at";

/// Repository for bill queries.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Gets a bill by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Bill>> {
        let sql = format!("SELECT {BILL_COLUMNS} FROM bills WHERE id = ?1");

        let bill = sqlx::query_as::<_, Bill>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(bill)
    }

    /// Lists the line items of a bill, in insertion order.
    pub async fn items_for(&self, bill_id: &str) -> DbResult<Vec<BillItem>> {
        let items = sqlx::query_as::<_, BillItem>(
            "SELECT id, bill_id, product_id, name, quantity, unit_price_paise, total_price_paise \
             FROM bill_items WHERE bill_id = ?1 ORDER BY rowid",
        )
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists bills in a half-open window `[from, to)`, newest first.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Bill>> {
        let sql = format!(
            "SELECT {BILL_COLUMNS} FROM bills \
             WHERE created_at >= ?1 AND created_at < ?2 \
             ORDER BY created_at DESC"
        );

        let bills = sqlx::query_as::<_, Bill>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(bills)
    }
}
