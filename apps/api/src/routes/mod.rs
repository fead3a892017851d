//! Route handlers, one module per surface.
//!
//! ## Role Gates
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  public     /health, /auth/signup, /auth/signin              │
//! │  customer+  /products (read), /orders, /credit-requests      │
//! │  staff+     /sales, /bills, /credits, /market-credits,       │
//! │             /pending-payments, order fulfilment              │
//! │  owner      /products (write), adjustments, request          │
//! │             decisions, /reports, user creation               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod bills;
pub mod credit_requests;
pub mod credits;
pub mod orders;
pub mod pending_payments;
pub mod products;
pub mod reports;
pub mod sales;

use axum::routing::get;
use axum::Router;

use crate::error::ApiError;
use crate::session::Session;
use crate::AppState;

async fn health() -> &'static str {
    "ok"
}

/// Customers may only read rows keyed by their own phone number; staff
/// sessions pass through.
pub(crate) async fn ensure_own_phone(
    state: &AppState,
    session: &Session,
    phone: &str,
) -> Result<(), ApiError> {
    if session.role.is_staff() {
        return Ok(());
    }

    let user = state
        .db
        .users()
        .get_by_id(&session.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    if user.phone != phone {
        return Err(ApiError::forbidden("Not your records"));
    }
    Ok(())
}

/// Resolves the ledger phone for a customer-initiated write. Staff may act
/// on behalf of any customer; a customer session always writes under its
/// own account phone, whatever the request body says.
pub(crate) async fn resolve_customer_phone(
    state: &AppState,
    session: &Session,
    requested: String,
) -> Result<String, ApiError> {
    if session.role.is_staff() {
        return Ok(requested);
    }

    let user = state
        .db
        .users()
        .get_by_id(&session.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    Ok(user.phone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use khata_core::{Role, User};
    use khata_db::{Database, DbConfig};

    use crate::auth::JwtManager;

    async fn state_with_user(role: Role, phone: &str) -> (AppState, Session) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = User {
            id: "u-1".to_string(),
            email: "ravi@example.com".to_string(),
            password_hash: "x".to_string(),
            name: "Ravi".to_string(),
            phone: phone.to_string(),
            role,
            created_at: Utc::now(),
        };
        db.users().insert(&user).await.unwrap();

        let state = AppState {
            db,
            jwt: Arc::new(JwtManager::new("test-secret".to_string(), 3600)),
        };
        let session = Session {
            user_id: "u-1".to_string(),
            name: "Ravi".to_string(),
            role,
        };
        (state, session)
    }

    #[tokio::test]
    async fn test_customer_reads_only_own_phone() {
        let (state, session) = state_with_user(Role::Customer, "9876543210").await;

        assert!(ensure_own_phone(&state, &session, "9876543210").await.is_ok());
        assert!(ensure_own_phone(&state, &session, "9999999999").await.is_err());
    }

    #[tokio::test]
    async fn test_staff_reads_any_phone() {
        let (state, session) = state_with_user(Role::Staff, "9876543210").await;
        assert!(ensure_own_phone(&state, &session, "9999999999").await.is_ok());
    }

    #[tokio::test]
    async fn test_customer_write_phone_bound_to_account() {
        let (state, session) = state_with_user(Role::Customer, "9876543210").await;

        // Body-supplied phone is ignored for customer sessions
        let phone = resolve_customer_phone(&state, &session, "9999999999".to_string())
            .await
            .unwrap();
        assert_eq!(phone, "9876543210");
    }

    #[tokio::test]
    async fn test_staff_write_phone_passes_through() {
        let (state, session) = state_with_user(Role::Staff, "9876543210").await;

        let phone = resolve_customer_phone(&state, &session, "9999999999".to_string())
            .await
            .unwrap();
        assert_eq!(phone, "9999999999");
    }
}

/// Assembles all route groups.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(auth::router())
        .merge(products::router())
        .merge(sales::router())
        .merge(bills::router())
        .merge(credits::router())
        .merge(credit_requests::router())
        .merge(pending_payments::router())
        .merge(orders::router())
        .merge(reports::router())
}
