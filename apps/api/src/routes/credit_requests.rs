//! Credit request routes.
//!
//! Customers raise a request for credit; owners approve or reject it.
//! A decided request is final, the approve/reject handlers surface
//! `ALREADY_DECIDED` when a second decision races in.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use khata_core::{CreditRequest, CreditRequestStatus, Money};
use khata_db::CreditRequestDraft;

use crate::error::ApiError;
use crate::session::Session;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/credit-requests", get(list_requests).post(create_request))
        .route("/credit-requests/customer/{phone}", get(list_for_customer))
        .route("/credit-requests/{id}/approve", post(approve_request))
        .route("/credit-requests/{id}/reject", post(reject_request))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreditRequestBody {
    customer_name: String,
    customer_phone: String,
    /// Rupees as a decimal string.
    amount: String,
    reason: String,
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    status: Option<CreditRequestStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RejectBody {
    reason: String,
}

async fn create_request(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreditRequestBody>,
) -> Result<Json<CreditRequest>, ApiError> {
    let customer_phone =
        super::resolve_customer_phone(&state, &session, req.customer_phone).await?;

    let draft = CreditRequestDraft {
        customer_name: req.customer_name,
        customer_phone,
        amount: Money::parse_rupees(&req.amount)?,
        reason: req.reason,
    };

    let request = state.db.ledger().create_credit_request(draft).await?;
    Ok(Json(request))
}

async fn list_requests(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<CreditRequest>>, ApiError> {
    session.require_staff()?;
    Ok(Json(state.db.credit_requests().list(query.status).await?))
}

async fn list_for_customer(
    State(state): State<AppState>,
    session: Session,
    Path(phone): Path<String>,
) -> Result<Json<Vec<CreditRequest>>, ApiError> {
    super::ensure_own_phone(&state, &session, &phone).await?;
    Ok(Json(
        state.db.credit_requests().list_by_customer(&phone).await?,
    ))
}

async fn approve_request(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<CreditRequest>, ApiError> {
    session.require_owner()?;

    let request = state
        .db
        .ledger()
        .approve_credit_request(&id, &session.user_id)
        .await?;
    Ok(Json(request))
}

async fn reject_request(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(body): Json<RejectBody>,
) -> Result<Json<CreditRequest>, ApiError> {
    session.require_owner()?;

    let request = state
        .db
        .ledger()
        .reject_credit_request(&id, &session.user_id, &body.reason)
        .await?;
    Ok(Json(request))
}
