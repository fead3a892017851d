//! Customer order routes.
//!
//! Any authenticated session may place an order; fulfilment and the
//! staff-facing list require a staff session. Fulfilment consumes stock,
//! so it can fail with `INSUFFICIENT_STOCK` even though placing didn't.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use khata_core::{Order, OrderStatus};
use khata_db::OrderDraft;

use crate::error::ApiError;
use crate::session::Session;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(place_order))
        .route("/orders/customer/{phone}", get(list_for_customer))
        .route("/orders/{id}/fulfil", post(fulfil_order))
        .route("/orders/{id}/cancel", post(cancel_order))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderRequest {
    customer_name: String,
    customer_phone: String,
    product_id: String,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    status: Option<OrderStatus>,
}

async fn place_order(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<OrderRequest>,
) -> Result<Json<Order>, ApiError> {
    let customer_phone =
        super::resolve_customer_phone(&state, &session, req.customer_phone).await?;

    let draft = OrderDraft {
        customer_name: req.customer_name,
        customer_phone,
        product_id: req.product_id,
        quantity: req.quantity,
    };

    let order = state.db.ledger().place_order(draft).await?;
    Ok(Json(order))
}

async fn list_orders(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    session.require_staff()?;
    Ok(Json(state.db.orders().list(query.status).await?))
}

async fn list_for_customer(
    State(state): State<AppState>,
    session: Session,
    Path(phone): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    super::ensure_own_phone(&state, &session, &phone).await?;
    Ok(Json(state.db.orders().list_by_customer(&phone).await?))
}

async fn fulfil_order(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    session.require_staff()?;

    let order = state.db.ledger().fulfil_order(&id).await?;
    Ok(Json(order))
}

async fn cancel_order(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    session.require_staff()?;

    let order = state.db.ledger().cancel_order(&id).await?;
    Ok(Json(order))
}
