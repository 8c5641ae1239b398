//! Authentication error types
//!
//! Errors are safe for external exposure: an unknown username and a wrong
//! password produce the same `InvalidCredentials` variant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials were presented
    #[error("Authentication required")]
    Unauthenticated,

    /// Authorization header present but not a well-formed Basic credential
    #[error("Malformed credentials")]
    MalformedCredentials,

    /// Unknown user or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but lacking the role the route requires
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// Password hashing failed
    #[error("Password hashing failed")]
    PasswordHashingFailed,

    /// Stored hash could not be parsed or checked
    #[error("Password verification failed")]
    PasswordVerificationFailed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not be exposed to clients)
    #[error("Internal error")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated
            | Self::MalformedCredentials
            | Self::InvalidCredentials
            | Self::PasswordVerificationFailed => 401,

            Self::InsufficientPermissions => 403,

            Self::PasswordHashingFailed | Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Get an error code for the client (safe to expose)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::MalformedCredentials => "INVALID_CREDENTIALS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::PasswordVerificationFailed => "INVALID_CREDENTIALS",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::PasswordHashingFailed => "INTERNAL_ERROR",
            Self::Config(_) => "INTERNAL_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a 401 response should carry a `WWW-Authenticate` challenge
    pub fn is_challenge(&self) -> bool {
        self.status_code() == 401
    }

    /// Get safe message for client (doesn't leak internal details)
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) | Self::Config(_) => "An internal error occurred".to_string(),
            Self::PasswordVerificationFailed => Self::InvalidCredentials.to_string(),
            _ => self.to_string(),
        }
    }
}

/// JSON body for authentication failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub msg: String,
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        Self {
            code: err.error_code().to_string(),
            msg: err.client_message(),
        }
    }
}
