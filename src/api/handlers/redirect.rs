//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look up the code in the store (one round trip, no retries)
/// 2. Increment the global visit counter (best-effort, never blocks)
/// 3. Return 301 Moved Permanently with the stored URL
///
/// # Errors
///
/// Returns 404 Not Found when the code is unknown or its TTL has elapsed,
/// and 500 when the store cannot be reached.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let target = state.links.resolve(&code).await?;

    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, target)],
    )
        .into_response())
}
