//! Cash Card REST API
//!
//! Owner-scoped CRUD for cash card records.
//!
//! # API Structure
//!
//! ```text
//! /cards          GET (list, paged)   POST (create)
//! /cards/:id      GET                 PUT (update amount)   DELETE
//! /health         liveness
//! /ready          store readiness
//! /swagger-ui     OpenAPI browser
//! ```
//!
//! # Authentication
//!
//! Every `/cards` request carries HTTP Basic credentials. The caller must
//! hold the `card-owner` role and only ever sees or changes their own
//! cards; another owner's card answers exactly like a missing one (404).

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::http::HeaderName;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use cashcard_auth::AuthLayer;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, CardListScope};

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Enable CORS for browser clients
    pub enable_cors: bool,
    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
    /// Enable response compression
    pub enable_compression: bool,
    /// Enable request tracing
    pub enable_tracing: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Requests slower than this are logged at `warn`
    pub slow_request_threshold: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            enable_compression: true,
            enable_tracing: true,
            max_body_size: 64 * 1024,
            slow_request_threshold: Duration::from_millis(1000),
        }
    }
}

/// Create the main API router with all middleware
pub fn create_router(state: Arc<AppState>, config: ApiConfig) -> Router {
    let auth = AuthLayer::new(state.authenticator.clone(), state.realm.as_str());

    let mut router = Router::new()
        .merge(routes::card_routes())
        .merge(routes::health_routes())
        .merge(routes::swagger_routes())
        .with_state(state)
        .layer(auth)
        .layer(axum::middleware::from_fn_with_state(
            config.slow_request_threshold,
            middleware::timing_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(config.max_body_size));

    // Add tracing
    if config.enable_tracing {
        router = router.layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        );
    }

    // Request ID outside tracing so the span sees it
    let x_request_id = HeaderName::from_static("x-request-id");
    router = router
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    // Add compression
    if config.enable_compression {
        router = router.layer(CompressionLayer::new());
    }

    // Add CORS
    if config.enable_cors {
        let cors = if config.cors_origins.contains(&"*".to_string()) {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(
                    config
                        .cors_origins
                        .iter()
                        .filter_map(|o| o.parse().ok())
                        .collect::<Vec<_>>(),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
        };
        router = router.layer(cors);
    }

    router
}

/// Create a minimal router for testing: authentication and card routes only
pub fn create_test_router(state: Arc<AppState>) -> Router {
    let auth = AuthLayer::new(state.authenticator.clone(), state.realm.as_str());

    Router::new()
        .merge(routes::card_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(auth)
}
