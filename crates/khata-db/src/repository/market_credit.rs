//! # Market Credit Repository
//!
//! Queries over the collectible credit book and its collection history.
//! Collections mutate two rows at once and live in the ledger.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use khata_core::{Collection, MarketCredit, MarketCreditStatus};

const CREDIT_COLUMNS: &str = "id, customer_name, customer_phone, amount_paise, \
     collected_paise, description, status, created_by, created_at";

/// Repository for market-credit queries.
#[derive(Debug, Clone)]
pub struct MarketCreditRepository {
    pool: SqlitePool,
}

impl MarketCreditRepository {
    /// Creates a new MarketCreditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MarketCreditRepository { pool }
    }

    /// Gets a market credit by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<MarketCredit>> {
        let sql = format!("SELECT {CREDIT_COLUMNS} FROM market_credits WHERE id = ?1");

        let credit = sqlx::query_as::<_, MarketCredit>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(credit)
    }

    /// Lists market credits, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<MarketCreditStatus>) -> DbResult<Vec<MarketCredit>> {
        let credits = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {CREDIT_COLUMNS} FROM market_credits \
                     WHERE status = ?1 ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, MarketCredit>(&sql)
                    .bind(status)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql =
                    format!("SELECT {CREDIT_COLUMNS} FROM market_credits ORDER BY created_at DESC");
                sqlx::query_as::<_, MarketCredit>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(credits)
    }

    /// Inserts a new market credit (status starts unpaid, nothing collected).
    pub async fn insert(&self, credit: &MarketCredit) -> DbResult<()> {
        debug!(id = %credit.id, amount_paise = credit.amount_paise, "Inserting market credit");

        sqlx::query(
            "INSERT INTO market_credits (id, customer_name, customer_phone, amount_paise, \
             collected_paise, description, status, created_by, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&credit.id)
        .bind(&credit.customer_name)
        .bind(&credit.customer_phone)
        .bind(credit.amount_paise)
        .bind(credit.collected_paise)
        .bind(&credit.description)
        .bind(credit.status)
        .bind(&credit.created_by)
        .bind(credit.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists collections recorded against one credit, newest first.
    pub async fn collections_for(&self, market_credit_id: &str) -> DbResult<Vec<Collection>> {
        let collections = sqlx::query_as::<_, Collection>(
            "SELECT id, market_credit_id, amount_paise, note, collected_by, created_at \
             FROM collections WHERE market_credit_id = ?1 ORDER BY created_at DESC",
        )
        .bind(market_credit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(collections)
    }

    /// Sum of outstanding (amount − collected) across unpaid credits.
    pub async fn total_outstanding(&self) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_paise - collected_paise), 0) \
             FROM market_credits WHERE status = 'unpaid'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
