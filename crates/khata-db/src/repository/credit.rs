//! # Customer Credit Repository
//!
//! The per-phone running credit ledger and its append-only transaction log.
//! Balance changes happen inside sale recording (ledger); this repository
//! only reads.

use sqlx::SqlitePool;

use crate::error::DbResult;
use khata_core::{CreditTransaction, CustomerCredit};

/// Repository for customer-credit queries.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: SqlitePool,
}

impl CreditRepository {
    /// Creates a new CreditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CreditRepository { pool }
    }

    /// Gets a customer's credit record by phone number.
    pub async fn get_by_phone(&self, phone: &str) -> DbResult<Option<CustomerCredit>> {
        let credit = sqlx::query_as::<_, CustomerCredit>(
            "SELECT phone, customer_name, total_credit_paise, created_at, updated_at \
             FROM customer_credits WHERE phone = ?1",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credit)
    }

    /// Lists all customer credit records, largest balance first.
    pub async fn list(&self) -> DbResult<Vec<CustomerCredit>> {
        let credits = sqlx::query_as::<_, CustomerCredit>(
            "SELECT phone, customer_name, total_credit_paise, created_at, updated_at \
             FROM customer_credits ORDER BY total_credit_paise DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(credits)
    }

    /// Lists a customer's ledger entries, newest first.
    pub async fn transactions_for(&self, phone: &str) -> DbResult<Vec<CreditTransaction>> {
        let transactions = sqlx::query_as::<_, CreditTransaction>(
            "SELECT id, customer_phone, kind, amount_paise, description, reference_id, created_at \
             FROM credit_transactions WHERE customer_phone = ?1 ORDER BY created_at DESC",
        )
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Sum of all outstanding customer-credit balances (dashboard KPI).
    pub async fn total_outstanding(&self) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_credit_paise), 0) FROM customer_credits",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
