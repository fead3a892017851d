//! # Credit Request Repository
//!
//! Customer-initiated credit asks. Creation is a single insert and lives
//! here; the approve/reject transitions are guarded one-shot updates in the
//! ledger.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use khata_core::{CreditRequest, CreditRequestStatus};

const REQUEST_COLUMNS: &str = "id, customer_name, customer_phone, amount_paise, reason, \
     status, rejection_reason, decided_by, decided_at, created_at";

/// Repository for credit-request queries.
#[derive(Debug, Clone)]
pub struct CreditRequestRepository {
    pool: SqlitePool,
}

impl CreditRequestRepository {
    /// Creates a new CreditRequestRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CreditRequestRepository { pool }
    }

    /// Gets a request by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CreditRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM credit_requests WHERE id = ?1");

        let request = sqlx::query_as::<_, CreditRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    /// Lists requests, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<CreditRequestStatus>) -> DbResult<Vec<CreditRequest>> {
        let requests = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {REQUEST_COLUMNS} FROM credit_requests \
                     WHERE status = ?1 ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, CreditRequest>(&sql)
                    .bind(status)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {REQUEST_COLUMNS} FROM credit_requests ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, CreditRequest>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(requests)
    }

    /// Lists a customer's own requests, newest first.
    pub async fn list_by_customer(&self, phone: &str) -> DbResult<Vec<CreditRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM credit_requests \
             WHERE customer_phone = ?1 ORDER BY created_at DESC"
        );

        let requests = sqlx::query_as::<_, CreditRequest>(&sql)
            .bind(phone)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    /// Inserts a new request (status starts pending).
    pub async fn insert(&self, request: &CreditRequest) -> DbResult<()> {
        debug!(id = %request.id, amount_paise = request.amount_paise, "Inserting credit request");

        sqlx::query(
            "INSERT INTO credit_requests (id, customer_name, customer_phone, amount_paise, \
             reason, status, rejection_reason, decided_by, decided_at, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&request.id)
        .bind(&request.customer_name)
        .bind(&request.customer_phone)
        .bind(request.amount_paise)
        .bind(&request.reason)
        .bind(request.status)
        .bind(&request.rejection_reason)
        .bind(&request.decided_by)
        .bind(request.decided_at)
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
