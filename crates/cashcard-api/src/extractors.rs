//! Custom Axum Extractors
//!
//! Request extractors for the authenticated principal, card ids, JSON bodies
//! and pagination. Every rejection is rendered through [`ApiError`].

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use cashcard_auth::AuthenticatedUser;

use crate::dto::{PaginationParams, MAX_PAGE_LIMIT};
use crate::error::ApiError;

// =============================================================================
// Principal Extractor
// =============================================================================

/// Name of the authenticated caller; the owner for every card operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .map(|user| Principal(user.username.clone()))
            .ok_or_else(|| ApiError::Unauthorized.into_response())
    }
}

// =============================================================================
// Path Extractor
// =============================================================================

/// Card id from the `/cards/:id` path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CardId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::InvalidParameter(e.body_text()).into_response())?;

        Ok(CardId(id))
    }
}

// =============================================================================
// JSON Body Extractor
// =============================================================================

/// JSON body extractor whose every rejection is a 400.
///
/// Plain `Json` answers 415 for a missing content type and 422 for a body
/// of the wrong shape; card endpoints treat all of these as bad requests.
pub struct CardJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for CardJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e.body_text(), "Rejected request body");
            ApiError::InvalidRequestBody(e.body_text()).into_response()
        })?;

        Ok(CardJson(value))
    }
}

// =============================================================================
// Pagination Extractor
// =============================================================================

/// Validated pagination parameters
pub struct Pagination(pub PaginationParams);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::InvalidParameter(e.body_text()).into_response())?;

        validate_pagination(&params).map_err(IntoResponse::into_response)?;

        Ok(Pagination(params))
    }
}

fn validate_pagination(params: &PaginationParams) -> Result<(), ApiError> {
    if params.page < 1 {
        return Err(ApiError::InvalidParameter("page must be >= 1".to_string()));
    }
    if params.limit < 1 || params.limit > MAX_PAGE_LIMIT {
        return Err(ApiError::InvalidParameter(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_LIMIT
        )));
    }
    Ok(())
}
