//! Billing routes (staff only).
//!
//! Regular bills pull items from the catalog and consume stock; custom
//! bills carry free-text lines for loose goods the catalog doesn't track.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use khata_core::ledger::DraftLine;
use khata_core::report::ReportWindow;
use khata_core::{Bill, BillItem, Money, PaymentMethod};
use khata_db::BillDraft;

use crate::error::ApiError;
use crate::session::Session;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bills", get(list_bills).post(create_bill))
        .route("/bills/{id}", get(get_bill))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillItemRequest {
    /// Required on regular bills, absent on custom ones.
    product_id: Option<String>,
    /// Free-text name for custom bill lines.
    #[serde(default)]
    name: String,
    quantity: i64,
    /// Rupees as a decimal string.
    unit_price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillRequest {
    customer_name: String,
    customer_phone: String,
    items: Vec<BillItemRequest>,
    /// Rupees string; defaults to no discount.
    discount: Option<String>,
    payment_method: PaymentMethod,
    #[serde(default)]
    is_custom: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BillResponse {
    bill: Bill,
    items: Vec<BillItem>,
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    #[serde(default = "default_window")]
    window: ReportWindow,
}

fn default_window() -> ReportWindow {
    ReportWindow::Today
}

async fn create_bill(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<BillRequest>,
) -> Result<Json<BillResponse>, ApiError> {
    session.require_staff()?;

    let mut lines = Vec::with_capacity(req.items.len());
    for item in &req.items {
        lines.push(DraftLine {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: Money::parse_rupees(&item.unit_price)?,
        });
    }

    let discount = match req.discount.as_deref() {
        Some(value) => Money::parse_rupees(value)?,
        None => Money::zero(),
    };

    let draft = BillDraft {
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        lines,
        discount,
        payment_method: req.payment_method,
        is_custom: req.is_custom,
        created_by: session.user_id.clone(),
    };

    let (bill, items) = state.db.ledger().create_bill(draft).await?;
    Ok(Json(BillResponse { bill, items }))
}

async fn list_bills(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<Bill>>, ApiError> {
    session.require_staff()?;

    let (from, to) = query.window.bounds(Utc::now());
    Ok(Json(state.db.bills().list_between(from, to).await?))
}

async fn get_bill(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<BillResponse>, ApiError> {
    session.require_staff()?;

    let bill = state
        .db
        .bills()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Bill not found: {id}")))?;
    let items = state.db.bills().items_for(&id).await?;

    Ok(Json(BillResponse { bill, items }))
}
