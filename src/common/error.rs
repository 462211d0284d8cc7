// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use crate::auth::error::AuthError;
use crate::auth::store::StoreError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    InternalServer(String),
    DatabaseError(StoreError),
    ValidationError(String),
    DuplicateEmail,
    DuplicateUsername,
    InvalidCredentials,
    InvalidToken,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::DuplicateEmail => write!(f, "Email already registered"),
            ApiError::DuplicateUsername => write!(f, "Username already taken"),
            ApiError::InvalidCredentials => write!(f, "Invalid credentials"),
            ApiError::InvalidToken => write!(f, "Invalid or expired token"),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
            ApiError::InternalServer(msg) => {
                error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR",
                )
            }
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
            ApiError::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                "Email already registered".to_string(),
                "DUPLICATE_EMAIL",
            ),
            ApiError::DuplicateUsername => (
                StatusCode::BAD_REQUEST,
                "Username already taken".to_string(),
                "DUPLICATE_USERNAME",
            ),
            ApiError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "Invalid credentials".to_string(),
                "INVALID_CREDENTIALS",
            ),
            ApiError::InvalidToken => (
                StatusCode::BAD_REQUEST,
                "Invalid or expired token".to_string(),
                "INVALID_TOKEN",
            ),
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateEmail => ApiError::DuplicateEmail,
            AuthError::DuplicateUsername => ApiError::DuplicateUsername,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::TokenInvalid(_) => ApiError::InvalidToken,
            AuthError::Unauthenticated | AuthError::UserNotFound => {
                ApiError::Unauthorized("Not authenticated".to_string())
            }
            AuthError::Validation(msg) => ApiError::ValidationError(msg),
            AuthError::Internal(msg) => ApiError::InternalServer(msg),
            AuthError::Store(e) => ApiError::DatabaseError(e),
        }
    }
}
