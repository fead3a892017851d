//! Request session.
//!
//! Who is calling, decoded from the bearer token exactly once per request.
//! Handlers receive a [`Session`] argument and gate on the role explicitly;
//! nothing reads ambient authentication state.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use khata_core::Role;

use crate::auth::extract_bearer_token;
use crate::error::ApiError;
use crate::AppState;

/// The authenticated caller of the current request.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub role: Role,
}

impl Session {
    /// Staff-level access (staff and owner).
    pub fn require_staff(&self) -> Result<(), ApiError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Staff access required"))
        }
    }

    /// Owner-only access.
    pub fn require_owner(&self) -> Result<(), ApiError> {
        if self.role == Role::Owner {
            Ok(())
        } else {
            Err(ApiError::forbidden("Owner access required"))
        }
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Expected Bearer token"))?;

        let claims = state.jwt.validate_token(token)?;

        Ok(Session {
            user_id: claims.sub,
            name: claims.name,
            role: claims.role,
        })
    }
}
