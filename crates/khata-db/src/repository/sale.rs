//! # Sale Repository
//!
//! Read-side queries over recorded sales. Sales are immutable once written,
//! so this repository has no update path; inserts happen inside
//! [`crate::ledger::Ledger::record_sale`] together with the stock decrement
//! and credit-ledger rows.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use khata_core::Sale;

const SALE_COLUMNS: &str = "id, product_id, product_name, customer_name, customer_phone, \
     quantity, unit_price_paise, total_paise, paid_paise, credit_paise, \
     payment_method, recorded_by, created_at";

/// Repository for sale queries.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Lists sales in a half-open window `[from, to)`, newest first.
    ///
    /// Report windows from `khata_core::report::ReportWindow::bounds` plug
    /// straight into this.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE created_at >= ?1 AND created_at < ?2 \
             ORDER BY created_at DESC"
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Lists the most recent sales.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY created_at DESC LIMIT ?1"
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }
}
