//! # Order Repository
//!
//! Customer pre-orders. Placement freezes the product name; the
//! fulfil/cancel transitions are guarded updates in the ledger (fulfilment
//! also consumes stock).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use khata_core::{Order, OrderStatus};

const ORDER_COLUMNS: &str = "id, customer_name, customer_phone, product_id, product_name, \
     quantity, status, created_at, updated_at";

/// Repository for order queries.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Lists orders, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        let orders = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {ORDER_COLUMNS} FROM orders \
                     WHERE status = ?1 ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, Order>(&sql)
                    .bind(status)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
                sqlx::query_as::<_, Order>(&sql).fetch_all(&self.pool).await?
            }
        };

        Ok(orders)
    }

    /// Lists a customer's own orders, newest first.
    pub async fn list_by_customer(&self, phone: &str) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE customer_phone = ?1 ORDER BY created_at DESC"
        );

        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(phone)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Inserts a new order (status starts placed).
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, product = %order.product_name, "Inserting order");

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
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
