//! Authentication routes: signup, signin, current user, staff creation.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use khata_core::validation::{validate_email, validate_phone, validate_text};
use khata_core::{Role, User};

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::session::Session;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/me", get(me))
        .route("/users", post(create_user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignupRequest {
    name: String,
    email: String,
    phone: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    name: String,
    email: String,
    phone: String,
    password: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SigninRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    user: User,
}

fn build_user(
    name: &str,
    email: &str,
    phone: &str,
    password: &str,
    role: Role,
) -> Result<User, ApiError> {
    let name = validate_text("name", name, 100)?;
    let email = validate_email(email)?;
    let phone = validate_phone(phone)?;

    if password.len() < 8 {
        return Err(ApiError::bad_request(
            "VALIDATION",
            "password must be at least 8 characters",
        ));
    }

    Ok(User {
        id: Uuid::new_v4().to_string(),
        email,
        password_hash: hash_password(password)?,
        name,
        phone,
        role,
        created_at: Utc::now(),
    })
}

/// Public signup always creates a customer account; staff and owner
/// accounts go through `POST /users`.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = build_user(&req.name, &req.email, &req.phone, &req.password, Role::Customer)?;
    state.db.users().insert(&user).await?;

    info!(user_id = %user.id, "Customer signed up");
    let token = state.jwt.generate_token(&user.id, &user.name, user.role)?;
    Ok(Json(AuthResponse { token, user }))
}

/// Owner-only account creation with an explicit role.
async fn create_user(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<User>, ApiError> {
    session.require_owner()?;

    let user = build_user(&req.name, &req.email, &req.phone, &req.password, req.role)?;
    state.db.users().insert(&user).await?;

    info!(user_id = %user.id, role = ?user.role, created_by = %session.user_id, "User created");
    Ok(Json(user))
}

async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = validate_email(&req.email)?;

    // Same error for unknown email and wrong password
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = state
        .db
        .users()
        .get_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(invalid());
    }

    info!(user_id = %user.id, "User signed in");
    let token = state.jwt.generate_token(&user.id, &user.name, user.role)?;
    Ok(Json(AuthResponse { token, user }))
}

async fn me(State(state): State<AppState>, session: Session) -> Result<Json<User>, ApiError> {
    let user = state
        .db
        .users()
        .get_by_id(&session.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User no longer exists"))?;

    Ok(Json(user))
}
