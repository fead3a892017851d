//! Reporting routes (owner only).
//!
//! The dashboard aggregates sales KPIs against the previous window plus
//! the three outstanding balances and the low-stock list. Revenue series
//! are grouped on request; CSV exports stream back as attachments.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use khata_core::export::{export_filename, market_credits_csv, sales_csv};
use khata_core::report::{
    compare_windows, low_stock, revenue_by_category, revenue_by_day, revenue_by_month,
    revenue_by_payment_method, KpiComparison, ReportWindow, RevenueBucket,
};
use khata_core::Product;

use crate::error::ApiError;
use crate::session::Session;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/dashboard", get(dashboard))
        .route("/reports/revenue", get(revenue))
        .route("/reports/sales.csv", get(export_sales))
        .route("/reports/market-credits.csv", get(export_market_credits))
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    #[serde(default = "default_window")]
    window: ReportWindow,
}

fn default_window() -> ReportWindow {
    ReportWindow::Today
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RevenueGroup {
    Day,
    Month,
    Method,
    Category,
}

#[derive(Debug, Deserialize)]
struct RevenueQuery {
    #[serde(default = "default_window")]
    window: ReportWindow,
    group: RevenueGroup,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Dashboard {
    kpis: KpiComparison,
    pending_payments_paise: i64,
    market_credit_outstanding_paise: i64,
    customer_credit_outstanding_paise: i64,
    low_stock: Vec<Product>,
}

async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    session.require_owner()?;

    let now = Utc::now();
    let (from, to) = query.window.bounds(now);
    let (prev_from, prev_to) = query.window.previous_bounds(now);

    let current = state.db.sales().list_between(from, to).await?;
    let previous = state.db.sales().list_between(prev_from, prev_to).await?;

    let products = state.db.products().list_active().await?;
    let low = low_stock(&products).into_iter().cloned().collect();

    Ok(Json(Dashboard {
        kpis: compare_windows(&current, &previous),
        pending_payments_paise: state.db.pending_payments().total_pending().await?,
        market_credit_outstanding_paise: state.db.market_credits().total_outstanding().await?,
        customer_credit_outstanding_paise: state.db.credits().total_outstanding().await?,
        low_stock: low,
    }))
}

async fn revenue(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RevenueQuery>,
) -> Result<Json<Vec<RevenueBucket>>, ApiError> {
    session.require_owner()?;

    let (from, to) = query.window.bounds(Utc::now());
    let sales = state.db.sales().list_between(from, to).await?;

    let buckets = match query.group {
        RevenueGroup::Day => revenue_by_day(&sales),
        RevenueGroup::Month => revenue_by_month(&sales),
        RevenueGroup::Method => revenue_by_payment_method(&sales),
        RevenueGroup::Category => {
            let products = state.db.products().list_all().await?;
            revenue_by_category(&sales, &products)
        }
    };

    Ok(Json(buckets))
}

fn csv_response(report_name: &str, body: String) -> Result<Response, ApiError> {
    let filename = export_filename(report_name, Utc::now().date_naive());
    let disposition = format!("attachment; filename=\"{filename}\"");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|_| ApiError::internal("Invalid export filename"))?,
    );

    Ok((StatusCode::OK, headers, body).into_response())
}

async fn export_sales(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<WindowQuery>,
) -> Result<Response, ApiError> {
    session.require_owner()?;

    let (from, to) = query.window.bounds(Utc::now());
    let sales = state.db.sales().list_between(from, to).await?;

    csv_response("sales-report", sales_csv(&sales)?)
}

async fn export_market_credits(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, ApiError> {
    session.require_owner()?;

    let credits = state.db.market_credits().list(None).await?;
    csv_response("market-credits-report", market_credits_csv(&credits)?)
}
