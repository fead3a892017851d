//! POS sale routes (staff only).

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use khata_core::report::ReportWindow;
use khata_core::{Money, PaymentMethod, Sale};
use khata_db::SaleDraft;

use crate::error::ApiError;
use crate::session::Session;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(record_sale))
        .route("/sales/{id}", get(get_sale))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaleRequest {
    product_id: String,
    customer_name: String,
    customer_phone: String,
    quantity: i64,
    /// Rupees string overriding the product's base price.
    unit_price: Option<String>,
    payment_method: PaymentMethod,
    /// Rupees string; defaults to the full total for cash/gpay.
    paid_amount: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    #[serde(default = "default_window")]
    window: ReportWindow,
}

fn default_window() -> ReportWindow {
    ReportWindow::Today
}

fn parse_optional_rupees(value: Option<&str>) -> Result<Option<Money>, ApiError> {
    value.map(Money::parse_rupees).transpose().map_err(Into::into)
}

async fn record_sale(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<SaleRequest>,
) -> Result<Json<Sale>, ApiError> {
    session.require_staff()?;

    let draft = SaleDraft {
        product_id: req.product_id,
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        quantity: req.quantity,
        unit_price: parse_optional_rupees(req.unit_price.as_deref())?,
        payment_method: req.payment_method,
        paid: parse_optional_rupees(req.paid_amount.as_deref())?,
        recorded_by: session.user_id.clone(),
    };

    let sale = state.db.ledger().record_sale(draft).await?;
    Ok(Json(sale))
}

async fn list_sales(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    session.require_staff()?;

    let (from, to) = query.window.bounds(Utc::now());
    Ok(Json(state.db.sales().list_between(from, to).await?))
}

async fn get_sale(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Sale>, ApiError> {
    session.require_staff()?;

    let sale = state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Sale not found: {id}")))?;
    Ok(Json(sale))
}
