//! # Khata API
//!
//! HTTP server for the Khata POS frontend. Thin handlers: parse + gate by
//! role, call into khata-db (which calls khata-core), serialize the result.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod session;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use khata_db::Database;

use crate::auth::JwtManager;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
