//! Credit ledger routes (staff only).
//!
//! Two separate books, deliberately not reconciled against each other:
//! the per-phone customer-credit ledger fed by credit sales, and the
//! manually granted market-credit book with its collection history.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use khata_core::{
    Collection, CreditTransaction, CustomerCredit, MarketCredit, MarketCreditStatus, Money,
};
use khata_db::MarketCreditDraft;

use crate::error::ApiError;
use crate::session::Session;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/credits", get(list_customer_credits))
        .route("/credits/{phone}", get(get_customer_credit))
        .route("/market-credits", get(list_market_credits).post(create_market_credit))
        .route("/market-credits/{id}", get(get_market_credit))
        .route("/market-credits/{id}/collections", get(list_collections).post(record_collection))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerCreditResponse {
    credit: CustomerCredit,
    transactions: Vec<CreditTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketCreditRequest {
    customer_name: String,
    customer_phone: String,
    /// Rupees as a decimal string.
    amount: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    status: Option<MarketCreditStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarketCreditResponse {
    credit: MarketCredit,
    collections: Vec<Collection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionRequest {
    /// Rupees as a decimal string.
    amount: String,
    note: String,
}

async fn list_customer_credits(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<CustomerCredit>>, ApiError> {
    session.require_staff()?;
    Ok(Json(state.db.credits().list().await?))
}

async fn get_customer_credit(
    State(state): State<AppState>,
    session: Session,
    Path(phone): Path<String>,
) -> Result<Json<CustomerCreditResponse>, ApiError> {
    session.require_staff()?;

    let credit = state
        .db
        .credits()
        .get_by_phone(&phone)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No credit record for {phone}")))?;
    let transactions = state.db.credits().transactions_for(&phone).await?;

    Ok(Json(CustomerCreditResponse {
        credit,
        transactions,
    }))
}

async fn list_market_credits(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<MarketCredit>>, ApiError> {
    session.require_staff()?;
    Ok(Json(state.db.market_credits().list(query.status).await?))
}

async fn create_market_credit(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<MarketCreditRequest>,
) -> Result<Json<MarketCredit>, ApiError> {
    session.require_staff()?;

    let draft = MarketCreditDraft {
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        amount: Money::parse_rupees(&req.amount)?,
        description: req.description,
        created_by: session.user_id.clone(),
    };

    let credit = state.db.ledger().create_market_credit(draft).await?;
    Ok(Json(credit))
}

async fn get_market_credit(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<MarketCreditResponse>, ApiError> {
    session.require_staff()?;

    let credit = state
        .db
        .market_credits()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Market credit not found: {id}")))?;
    let collections = state.db.market_credits().collections_for(&id).await?;

    Ok(Json(MarketCreditResponse {
        credit,
        collections,
    }))
}

async fn list_collections(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Vec<Collection>>, ApiError> {
    session.require_staff()?;
    Ok(Json(state.db.market_credits().collections_for(&id).await?))
}

async fn record_collection(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<CollectionRequest>,
) -> Result<Json<Collection>, ApiError> {
    session.require_staff()?;

    let amount = Money::parse_rupees(&req.amount)?;
    let collection = state
        .db
        .ledger()
        .record_collection(&id, amount, &req.note, &session.user_id)
        .await?;
    Ok(Json(collection))
}
