use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Flat error taxonomy rendered into the uniform response envelope. The
/// `message` is drawn from a fixed per-status table; the variant payload is
/// the human-facing `customMessage`. Root causes are logged server-side and
/// never echoed to clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    InvalidData(String),

    #[error("{0}")]
    TokenExpired(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    ServiceError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyExists(_) => StatusCode::CONFLICT,
            ApiError::InvalidData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TokenExpired(_) => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ApiError::ServiceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fixed message for the status, uniform across every endpoint.
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "The requested resource was not found",
            ApiError::AlreadyExists(_) => "Resource already exists",
            ApiError::InvalidData(_) => {
                "The request contains invalid data and cannot be processed"
            }
            ApiError::TokenExpired(_) => "The authentication token has expired",
            ApiError::PermissionDenied(_) => "Access denied: insufficient permissions",
            ApiError::ServiceError(_) => "The server encountered an unexpected error",
        }
    }

    pub fn custom_message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::AlreadyExists(msg)
            | ApiError::InvalidData(msg)
            | ApiError::TokenExpired(msg)
            | ApiError::PermissionDenied(msg)
            | ApiError::ServiceError(msg) => msg,
        }
    }
}

// Constructor shorthands used throughout the handlers
impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        ApiError::AlreadyExists(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        ApiError::InvalidData(message.into())
    }

    pub fn token_expired(message: impl Into<String>) -> Self {
        ApiError::TokenExpired(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        ApiError::PermissionDenied(message.into())
    }

    pub fn service_error(message: impl Into<String>) -> Self {
        ApiError::ServiceError(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!("store error: {}", err);
        ApiError::service_error("The server encountered an issue while accessing stored data.")
    }
}

impl From<crate::auth::JwtError> for ApiError {
    fn from(err: crate::auth::JwtError) -> Self {
        match err {
            crate::auth::JwtError::Invalid => {
                ApiError::token_expired("Token has expired. Please log in again.")
            }
            crate::auth::JwtError::Generation(msg) => {
                tracing::error!("token generation failed: {}", msg);
                ApiError::service_error("Failed to issue an authentication token.")
            }
        }
    }
}

impl From<crate::payment::PaymentError> for ApiError {
    fn from(err: crate::payment::PaymentError) -> Self {
        tracing::error!("payment provider error: {}", err);
        ApiError::service_error("Payment initiation failed.")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({
            "status": "error",
            "message": self.message(),
            "customMessage": self.custom_message(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_the_fixed_status_table() {
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::already_exists("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::invalid_data("x").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::token_expired("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::permission_denied("x").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::service_error("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn keeps_custom_message_separate_from_fixed_text() {
        let err = ApiError::already_exists("Tag with the same name already exists.");
        assert_eq!(err.message(), "Resource already exists");
        assert_eq!(err.custom_message(), "Tag with the same name already exists.");
    }
}
