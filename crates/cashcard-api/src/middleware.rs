//! API Middleware
//!
//! Request timing: slow-request logging and HTTP metrics.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};

/// Total requests, labelled by method and status
pub const HTTP_REQUESTS_TOTAL: &str = "cashcard_http_requests_total";
/// Request latency histogram, labelled by method
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "cashcard_http_request_duration_seconds";

/// Request timing middleware
///
/// The state is the slow-request threshold. Requests slower than it are
/// logged at `warn`.
pub async fn timing_middleware(
    State(slow_threshold): State<Duration>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();

    metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method.to_string())
        .record(elapsed.as_secs_f64());

    if elapsed > slow_threshold {
        tracing::warn!(
            method = %method,
            uri = %uri,
            elapsed_ms = elapsed.as_millis(),
            status,
            "Slow request detected"
        );
    } else {
        tracing::debug!(
            method = %method,
            uri = %uri,
            elapsed_ms = elapsed.as_millis(),
            status,
            "Request completed"
        );
    }

    response
}
