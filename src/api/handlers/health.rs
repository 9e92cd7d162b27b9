//! Handler for the health check endpoint.

use axum::Json;

use crate::api::dto::health::HealthResponse;

/// Liveness probe.
///
/// # Endpoint
///
/// `GET /health`
///
/// Always answers `200 {"status": "ok"}` while the process is serving
/// requests; store reachability is deliberately not part of liveness.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
