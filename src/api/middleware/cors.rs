//! CORS configuration for the shorten API.

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Creates the CORS middleware.
///
/// Browser frontends on arbitrary origins may POST to the shorten endpoint
/// and follow redirects. The API carries no credentials.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
