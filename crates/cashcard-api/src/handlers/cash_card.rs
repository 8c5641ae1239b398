//! Cash Card Handlers
//!
//! Owner-scoped CRUD. The owner of every record is the authenticated
//! principal; `id` and `owner` in request bodies are never trusted.
//!
//! Update and delete look the record up and then write by id in a second
//! store call. A concurrent delete between the two is not detected.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use cashcard_db::{PageRequest, SaveCashCard};

use crate::dto::{CashCardRequest, CashCardResponse, PaginationParams};
use crate::error::{ApiError, ApiResult, ErrorResponse};
use crate::extractors::{CardId, CardJson, Pagination, Principal};
use crate::state::{AppState, CardListScope};

/// Location of a card resource
pub fn card_location(id: i64) -> String {
    format!("/cards/{}", id)
}

/// Get a single cash card
#[utoipa::path(
    get,
    path = "/cards/{id}",
    tag = "Cash Cards",
    params(("id" = i64, Path, description = "Cash card id")),
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Cash card", body = CashCardResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Caller is not a card owner", body = ErrorResponse),
        (status = 404, description = "No such card for this owner", body = ErrorResponse)
    )
)]
pub async fn get_cash_card(
    State(state): State<Arc<AppState>>,
    Principal(owner): Principal,
    CardId(id): CardId,
) -> ApiResult<Json<CashCardResponse>> {
    let card = state
        .store
        .find_by_id_and_owner(id, &owner)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(card.into()))
}

/// List cash cards
///
/// Returns the caller's cards ordered by amount, one page at a time.
#[utoipa::path(
    get,
    path = "/cards",
    tag = "Cash Cards",
    params(PaginationParams),
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Cash cards", body = Vec<CashCardResponse>),
        (status = 400, description = "Invalid pagination parameters", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Caller is not a card owner", body = ErrorResponse)
    )
)]
pub async fn list_cash_cards(
    State(state): State<Arc<AppState>>,
    Principal(owner): Principal,
    Pagination(params): Pagination,
) -> ApiResult<Json<Vec<CashCardResponse>>> {
    let page = PageRequest::new(params.offset(), params.limit);
    let cards = match state.list_scope {
        CardListScope::Owner => state.store.find_by_owner(&owner, page).await?,
        CardListScope::All => state.store.find_all(page).await?,
    };

    Ok(Json(cards.into_iter().map(CashCardResponse::from).collect()))
}

/// Create a cash card
///
/// The new card belongs to the caller. Responds with an empty body and the
/// card's location.
#[utoipa::path(
    post,
    path = "/cards",
    tag = "Cash Cards",
    request_body = CashCardRequest,
    security(("basic_auth" = [])),
    responses(
        (status = 201, description = "Created", headers(("Location" = String, description = "URI of the new card"))),
        (status = 400, description = "Invalid body or the card could not be stored", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Caller is not a card owner", body = ErrorResponse)
    )
)]
pub async fn create_cash_card(
    State(state): State<Arc<AppState>>,
    Principal(owner): Principal,
    CardJson(req): CardJson<CashCardRequest>,
) -> ApiResult<Response> {
    let card = state
        .store
        .save(SaveCashCard::insert(req.amount, owner))
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Failed to store new cash card");
            ApiError::BadRequest("Cash card could not be created".to_string())
        })?;

    tracing::info!(card_id = card.id, owner = %card.owner, "Cash card created");

    Ok((StatusCode::CREATED, [(header::LOCATION, card_location(card.id))]).into_response())
}

/// Update a cash card's amount
#[utoipa::path(
    put,
    path = "/cards/{id}",
    tag = "Cash Cards",
    params(("id" = i64, Path, description = "Cash card id")),
    request_body = CashCardRequest,
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Updated cash card", body = CashCardResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Caller is not a card owner", body = ErrorResponse),
        (status = 404, description = "No such card for this owner", body = ErrorResponse)
    )
)]
pub async fn update_cash_card(
    State(state): State<Arc<AppState>>,
    Principal(owner): Principal,
    CardId(id): CardId,
    CardJson(req): CardJson<CashCardRequest>,
) -> ApiResult<Json<CashCardResponse>> {
    let existing = state
        .store
        .find_by_id_and_owner(id, &owner)
        .await?
        .ok_or(ApiError::NotFound)?;

    let card = state
        .store
        .save(SaveCashCard::overwrite(existing.id, req.amount, owner))
        .await?;

    tracing::info!(card_id = card.id, owner = %card.owner, amount = %card.amount, "Cash card updated");

    Ok(Json(card.into()))
}

/// Delete a cash card
#[utoipa::path(
    delete,
    path = "/cards/{id}",
    tag = "Cash Cards",
    params(("id" = i64, Path, description = "Cash card id")),
    security(("basic_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponse),
        (status = 403, description = "Caller is not a card owner", body = ErrorResponse),
        (status = 404, description = "No such card for this owner", body = ErrorResponse)
    )
)]
pub async fn delete_cash_card(
    State(state): State<Arc<AppState>>,
    Principal(owner): Principal,
    CardId(id): CardId,
) -> ApiResult<StatusCode> {
    if !state.store.exists_by_id_and_owner(id, &owner).await? {
        return Err(ApiError::NotFound);
    }

    state.store.delete_by_id(id).await?;

    tracing::info!(card_id = id, owner = %owner, "Cash card deleted");

    Ok(StatusCode::NO_CONTENT)
}
