// src/api/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::auth::AuthError;

/// Standard API error response format. The body is always
/// `{"detail": "..."}` with a matching status code; internals never leak.
#[derive(Debug)]
pub struct ApiError {
    pub detail: String,
    pub status_code: StatusCode,
}

impl ApiError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            status_code: StatusCode::BAD_REQUEST,
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            status_code: StatusCode::NOT_FOUND,
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            status_code: StatusCode::UNAUTHORIZED,
        }
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            status_code: StatusCode::FORBIDDEN,
        }
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            status_code: StatusCode::CONFLICT,
        }
    }

    pub fn unprocessable_entity(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            status_code: StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.detail)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailTaken => Self::bad_request(err.to_string()),
            AuthError::InvalidCredentials | AuthError::Disabled | AuthError::InvalidToken => {
                Self::unauthorized(err.to_string())
            }
            AuthError::TokenNotFound | AuthError::UserNotFound => Self::not_found(err.to_string()),
            AuthError::Database(e) => {
                error!("Auth database error: {:?}", e);
                Self::internal("Internal server error")
            }
            AuthError::Internal(e) => {
                error!("Auth internal error: {:?}", e);
                Self::internal("Internal server error")
            }
        }
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Extension trait for Option<T> to create ApiError for None cases
pub trait IntoApiErrorOption<T> {
    fn ok_or_not_found(self, detail: &str) -> Result<T, ApiError>;
}

impl<T> IntoApiErrorOption<T> for Option<T> {
    fn ok_or_not_found(self, detail: &str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(detail))
    }
}

/// Helper for database operation errors: log the detail, return a generic 500.
pub fn db_error(operation: &str, error: impl std::fmt::Debug) -> ApiError {
    error!("Database error during {}: {:?}", operation, error);
    ApiError::internal(format!("Database error during {}", operation))
}
