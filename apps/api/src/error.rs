//! # API Error Types
//!
//! The JSON error surface of the HTTP API. Every error body has the same
//! shape:
//!
//! ```json
//! { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for ..." }
//! ```
//!
//! ## Error Flow
//! ```text
//! ValidationError / CoreError ──► DbError ──► ApiError ──► JSON response
//! ```
//!
//! Status mapping: validation → 400, auth → 401/403, missing → 404,
//! ledger-rule conflicts (stock, over-collection, decided requests) → 409,
//! everything else → 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use khata_core::export::ExportError;
use khata_core::{CoreError, ValidationError};
use khata_db::DbError;

/// Error payload returned to HTTP clients.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message for display.
    pub message: String,
    /// HTTP status, not serialized into the body.
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        ApiError {
            code: code.to_string(),
            message: message.into(),
            status,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn conflict(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, code, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::bad_request("VALIDATION", err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::Validation(_) => ApiError::bad_request("VALIDATION", err.to_string()),
            CoreError::InsufficientStock { .. } => {
                ApiError::conflict("INSUFFICIENT_STOCK", err.to_string())
            }
            CoreError::Overpayment { .. } | CoreError::PendingOverpayment { .. } => {
                ApiError::bad_request("OVERPAYMENT", err.to_string())
            }
            CoreError::OverCollection { .. } => {
                ApiError::bad_request("OVER_COLLECTION", err.to_string())
            }
            CoreError::RequestAlreadyDecided { .. } => {
                ApiError::conflict("ALREADY_DECIDED", err.to_string())
            }
            CoreError::InvalidOrderStatus { .. } => {
                ApiError::conflict("INVALID_STATUS", err.to_string())
            }
            CoreError::PaymentSplitMismatch { .. } => {
                ApiError::bad_request("PAYMENT_SPLIT", err.to_string())
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::conflict("DUPLICATE", err.to_string()),
            DbError::Domain(core) => core.into(),
            DbError::ForeignKeyViolation { .. } => {
                ApiError::bad_request("INVALID_REFERENCE", err.to_string())
            }
            // pool/query/migration failures are server-side problems
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_maps_to_conflict() {
        let err: ApiError = DbError::Domain(CoreError::InsufficientStock {
            product: "Oil".to_string(),
            available: 1,
            requested: 2,
        })
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "INSUFFICIENT_STOCK");
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: ApiError = ValidationError::Required {
            field: "phone".to_string(),
        }
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "VALIDATION");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err: ApiError = DbError::not_found("Product", "p-1").into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
