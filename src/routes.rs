//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /api/v1`   - Create a short link
//! - `GET  /{code}`   - Short link redirect
//! - `GET  /health`   - Liveness probe
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Browser frontends may call the API from any origin
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{health_handler, redirect_handler, shorten_handler};
use crate::api::middleware::{cors, tracing};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// `/health` is registered before the `/{code}` catch-all, so `health` can
/// never be resolved as a short code (it is also a reserved alias).
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/api/v1", post(shorten_handler))
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .with_state(state)
        .layer(cors::layer())
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
