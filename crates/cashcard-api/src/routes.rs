//! API Routes
//!
//! Route definitions for all API endpoints.

use axum::{
    middleware::from_fn,
    routing::get,
    Router,
};
use std::sync::Arc;

use cashcard_auth::require_card_owner;

use crate::handlers;
use crate::state::AppState;

/// Cash card routes; every one requires the card-owner role
pub fn card_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/cards",
            get(handlers::cash_card::list_cash_cards).post(handlers::cash_card::create_cash_card),
        )
        .route(
            "/cards/:id",
            get(handlers::cash_card::get_cash_card)
                .put(handlers::cash_card::update_cash_card)
                .delete(handlers::cash_card::delete_cash_card),
        )
        .route_layer(from_fn(require_card_owner))
}

/// Unauthenticated health routes
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
}

/// Create Swagger UI routes
pub fn swagger_routes() -> Router<Arc<AppState>> {
    use crate::openapi::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
