use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use jobboard_auth::{AuthzError, PasswordError, TokenError};
use jobboard_core::DomainError;
use jobboard_infra::StoreError;

pub const NOT_FOUND: &str = "Not found.";

/// Error returned by every handler. Rendered as `{"detail": "..."}`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Logged server-side; the client only sees a generic message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found() -> Self {
        ApiError::NotFound(NOT_FOUND.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                json_error(status, "Internal server error")
            }
            ApiError::Validation(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => json_error(status, msg),
        }
    }
}

pub fn json_error(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "detail": detail.into() }))).into_response()
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::Authentication(msg) => ApiError::Unauthenticated(msg),
            DomainError::Authorization(msg) => ApiError::Forbidden(msg),
            DomainError::NotFound(_) | DomainError::InvalidId(_) => ApiError::not_found(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::not_found(),
            StoreError::Conflict(msg) => ApiError::Validation(msg),
            StoreError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => ApiError::Unauthenticated(err.to_string()),
            AuthzError::Forbidden { .. } => ApiError::Forbidden(err.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(msg) => ApiError::Internal(msg),
            TokenError::Expired => ApiError::Unauthenticated("Token is invalid or expired".into()),
            TokenError::Invalid(_) | TokenError::Claims(_) => {
                ApiError::Unauthenticated("Given token not valid for any token type".into())
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Weak(msg) => ApiError::Validation(msg),
            PasswordError::Hashing(msg) => ApiError::Internal(msg),
        }
    }
}
