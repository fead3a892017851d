//! Product catalog and stock adjustment routes.
//!
//! Reads are open to any authenticated session (customers browse the
//! catalog to order); writes are owner-only.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use khata_core::validation::{validate_non_negative_amount, validate_text};
use khata_core::{AdjustmentKind, Money, Product, StockAdjustment, Unit};

use crate::error::ApiError;
use crate::session::Session;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/low-stock", get(low_stock))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            "/products/{id}/adjustments",
            get(list_adjustments).post(adjust_stock),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRequest {
    name: String,
    category: String,
    product_type: String,
    packaging: String,
    /// Rupees as a decimal string, e.g. "140.50".
    base_price: String,
    #[serde(default)]
    stock: i64,
    unit: Unit,
    #[serde(default)]
    low_stock_alert: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdjustmentRequest {
    kind: AdjustmentKind,
    quantity: i64,
    reason: String,
}

async fn list_products(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.db.products().list_active().await?))
}

async fn low_stock(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Product>>, ApiError> {
    session.require_staff()?;
    Ok(Json(state.db.products().list_low_stock().await?))
}

async fn get_product(
    State(state): State<AppState>,
    _session: Session,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {id}")))?;
    Ok(Json(product))
}

fn parse_product(req: &ProductRequest) -> Result<Product, ApiError> {
    let base_price = Money::parse_rupees(&req.base_price)?;
    validate_non_negative_amount("stock", req.stock)?;
    validate_non_negative_amount("lowStockAlert", req.low_stock_alert)?;
    let now = Utc::now();

    Ok(Product {
        id: Uuid::new_v4().to_string(),
        name: validate_text("name", &req.name, 100)?,
        category: validate_text("category", &req.category, 50)?,
        product_type: validate_text("productType", &req.product_type, 50)?,
        packaging: validate_text("packaging", &req.packaging, 50)?,
        base_price_paise: base_price.paise(),
        stock: req.stock,
        unit: req.unit,
        low_stock_alert: req.low_stock_alert,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

async fn create_product(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    session.require_owner()?;

    let product = parse_product(&req)?;
    state.db.products().insert(&product).await?;
    Ok(Json(product))
}

async fn update_product(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    session.require_owner()?;

    let existing = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {id}")))?;

    // Catalog fields only; stock moves through adjustments
    let parsed = parse_product(&req)?;
    let updated = Product {
        id: existing.id.clone(),
        stock: existing.stock,
        created_at: existing.created_at,
        is_active: existing.is_active,
        ..parsed
    };

    state.db.products().update(&updated).await?;
    Ok(Json(updated))
}

async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    session.require_owner()?;

    state.db.products().soft_delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

async fn adjust_stock(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<AdjustmentRequest>,
) -> Result<Json<StockAdjustment>, ApiError> {
    session.require_owner()?;

    let adjustment = state
        .db
        .ledger()
        .adjust_stock(&id, req.kind, req.quantity, &req.reason, &session.user_id)
        .await?;
    Ok(Json(adjustment))
}

async fn list_adjustments(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Vec<StockAdjustment>>, ApiError> {
    session.require_owner()?;
    Ok(Json(state.db.products().adjustments_for(&id).await?))
}
