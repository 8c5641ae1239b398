//! API error handling
//!
//! Every handler returns [`ApiResult`]; the mapping from error to HTTP status
//! lives here and nowhere else.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Authentication Errors
    // =========================================================================
    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    // =========================================================================
    // Request Errors
    // =========================================================================
    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    // =========================================================================
    // Resource Errors
    // =========================================================================
    /// Deliberately carries no detail: a missing id and an id owned by
    /// someone else must be indistinguishable.
    #[error("Cash card not found")]
    NotFound,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Database error")]
    DatabaseError,

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHENTICATED",
            Self::Forbidden => "INSUFFICIENT_PERMISSIONS",
            Self::InvalidRequestBody(_) => "INVALID_REQUEST_BODY",
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::DatabaseError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) | Self::InvalidParameter(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }

            Self::Unauthorized => StatusCode::UNAUTHORIZED,

            Self::Forbidden => StatusCode::FORBIDDEN,

            Self::NotFound => StatusCode::NOT_FOUND,

            Self::DatabaseError | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,

            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message safe to return to clients
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// API error response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub msg: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.error_code().to_string(),
            msg: err.client_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<cashcard_auth::AuthError> for ApiError {
    fn from(err: cashcard_auth::AuthError) -> Self {
        match err.status_code() {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            _ => Self::Internal(err.to_string()),
        }
    }
}

impl From<cashcard_db::DbError> for ApiError {
    fn from(err: cashcard_db::DbError) -> Self {
        use cashcard_db::DbError;
        tracing::error!(error = ?err, "Database error");
        match err {
            DbError::NotFound(_) => Self::NotFound,
            DbError::InvalidInput(msg) => Self::InvalidParameter(msg),
            DbError::Connection(_) | DbError::Unavailable(_) => Self::ServiceUnavailable,
            _ => Self::DatabaseError,
        }
    }
}
