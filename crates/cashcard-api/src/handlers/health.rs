//! Health Check Handlers
//!
//! Endpoints for service health monitoring.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::dto::{HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// Store failure details stay in the logs
const STORE_UNREACHABLE: &str = "store unreachable";

/// Health check endpoint
///
/// Returns 200 if the service is running. Does not touch the store.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check endpoint
///
/// Returns 200 once the record store answers its health check.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Service is not ready", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let store = state.store.backend().to_string();

    let error = match state.store.health_check().await {
        Ok(true) => None,
        Ok(false) => {
            tracing::warn!(store = %store, "Store health check failed");
            Some(STORE_UNREACHABLE.to_string())
        }
        Err(e) => {
            tracing::warn!(store = %store, error = %e, "Readiness check failed");
            Some(STORE_UNREACHABLE.to_string())
        }
    };

    let (status_code, status) = match error {
        None => (StatusCode::OK, "ready"),
        Some(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_ready"),
    };

    (
        status_code,
        Json(ReadinessResponse {
            status: status.to_string(),
            store,
            error,
        }),
    )
}
