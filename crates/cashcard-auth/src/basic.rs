//! HTTP Basic credential parsing

use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{AuthError, AuthResult};
use crate::types::BasicCredentials;

/// Extract Basic credentials from request headers.
///
/// Returns `Ok(None)` when no `Authorization` header is present, and
/// `MalformedCredentials` when one is present but is not valid Basic.
pub fn extract_basic_credentials(headers: &HeaderMap) -> AuthResult<Option<BasicCredentials>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| AuthError::MalformedCredentials)?;
    parse_basic(value).map(Some)
}

/// Parse a `Basic <base64(user:password)>` header value
pub fn parse_basic(value: &str) -> AuthResult<BasicCredentials> {
    let (scheme, encoded) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedCredentials)?;

    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(AuthError::MalformedCredentials);
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AuthError::MalformedCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or(AuthError::MalformedCredentials)?;

    if username.is_empty() {
        return Err(AuthError::MalformedCredentials);
    }

    Ok(BasicCredentials::new(username, password))
}

/// Build a `Basic` header value; used by clients and tests
pub fn encode_basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}
