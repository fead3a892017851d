//! # Pending Payment Repository
//!
//! Read-side queries over amounts still owed. Rows are created by sale/bill
//! recording and advanced by `Ledger::record_pending_payment`; both are
//! transactional and live in the ledger.

use sqlx::SqlitePool;

use crate::error::DbResult;
use khata_core::{PendingPayment, PendingPaymentStatus};

const PAYMENT_COLUMNS: &str = "id, source_kind, source_id, customer_name, customer_phone, \
     total_paise, paid_paise, status, due_date, created_at, updated_at";

/// Repository for pending-payment queries.
#[derive(Debug, Clone)]
pub struct PendingPaymentRepository {
    pool: SqlitePool,
}

impl PendingPaymentRepository {
    /// Creates a new PendingPaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PendingPaymentRepository { pool }
    }

    /// Lists pending payments, newest first, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<PendingPaymentStatus>,
    ) -> DbResult<Vec<PendingPayment>> {
        let payments = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {PAYMENT_COLUMNS} FROM pending_payments \
                     WHERE status = ?1 ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, PendingPayment>(&sql)
                    .bind(status)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {PAYMENT_COLUMNS} FROM pending_payments ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, PendingPayment>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(payments)
    }

    /// Lists a customer's pending payments, newest first.
    pub async fn list_by_customer(&self, phone: &str) -> DbResult<Vec<PendingPayment>> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM pending_payments \
             WHERE customer_phone = ?1 ORDER BY created_at DESC"
        );

        let payments = sqlx::query_as::<_, PendingPayment>(&sql)
            .bind(phone)
            .fetch_all(&self.pool)
            .await?;

        Ok(payments)
    }

    /// Sum still owed across unsettled rows (dashboard KPI).
    pub async fn total_pending(&self) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_paise - paid_paise), 0) \
             FROM pending_payments WHERE status != 'paid'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
