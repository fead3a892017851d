//! Pending payment routes.
//!
//! Rows here are opened automatically whenever a sale or bill leaves a
//! credit balance; instalments chip away at them until they flip to paid.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use khata_core::{Money, PendingPayment, PendingPaymentStatus};

use crate::error::ApiError;
use crate::session::Session;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pending-payments", get(list_payments))
        .route("/pending-payments/customer/{phone}", get(list_for_customer))
        .route("/pending-payments/{id}/payments", post(record_instalment))
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    status: Option<PendingPaymentStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstalmentRequest {
    /// Rupees as a decimal string.
    amount: String,
}

async fn list_payments(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<PendingPayment>>, ApiError> {
    session.require_staff()?;
    Ok(Json(state.db.pending_payments().list(query.status).await?))
}

async fn list_for_customer(
    State(state): State<AppState>,
    session: Session,
    Path(phone): Path<String>,
) -> Result<Json<Vec<PendingPayment>>, ApiError> {
    super::ensure_own_phone(&state, &session, &phone).await?;
    Ok(Json(
        state.db.pending_payments().list_by_customer(&phone).await?,
    ))
}

async fn record_instalment(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<InstalmentRequest>,
) -> Result<Json<PendingPayment>, ApiError> {
    session.require_staff()?;

    let amount = Money::parse_rupees(&req.amount)?;
    let payment = state.db.ledger().record_pending_payment(&id, amount).await?;
    Ok(Json(payment))
}
