//! Handler for the link shortening endpoint.

use axum::{
    Json,
    extract::{ConnectInfo, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tracing::warn;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::application::rate_limiter::RateLimitDecision;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a target URL.
///
/// # Endpoint
///
/// `POST /api/v1`
///
/// # Request Flow
///
/// 1. Parse the JSON body
/// 2. Count the request against the caller's rate bucket; over quota stops
///    here with 429. A store failure during this step fails OPEN: the
///    request proceeds unthrottled and no rate headers are attached
/// 3. Validate and normalize the target URL, apply the target domain policy
/// 4. Generate or validate the short code and persist the mapping with TTL
/// 5. Refund one count for the confirmed write, re-read the bucket, and
///    assemble the response
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "short": "my-alias",   // optional
///   "expiry": 48           // optional, hours
/// }
/// ```
///
/// # Errors
///
/// - 400 - malformed body or invalid URL
/// - 403 - alias already in use
/// - 429 - quota exhausted (body carries `rate_limit_reset` minutes)
/// - 500 - code generation or persistence failure
/// - 503 - target domain denied
pub async fn shorten_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return AppError::bad_request("cannot parse JSON").into_response();
    };

    let client_ip = addr.ip().to_string();
    let decision = match state.limiter.check(&client_ip).await {
        Ok(decision) => Some(decision),
        Err(e) => {
            warn!(client = %client_ip, error = %e, "rate limit check failed, letting request through");
            None
        }
    };

    if let Some(decision) = &decision
        && !decision.allowed
    {
        let mut response = AppError::rate_limited(decision.reset).into_response();
        attach_rate_headers(&mut response, decision);
        return response;
    }

    let mut response =
        match process(&state, &headers, request, &client_ip, decision.is_some()).await {
            Ok(body) => Json(body).into_response(),
            Err(e) => e.into_response(),
        };

    if let Some(decision) = &decision {
        attach_rate_headers(&mut response, decision);
    }

    response
}

async fn process(
    state: &AppState,
    headers: &HeaderMap,
    request: ShortenRequest,
    client_ip: &str,
    limiter_reachable: bool,
) -> Result<ShortenResponse, AppError> {
    request
        .validate()
        .map_err(|_| AppError::bad_request("invalid URL"))?;

    let base = short_link_base(state.public_domain.as_deref(), headers)?;

    let link = state
        .links
        .create_link(&request.url, request.short.as_deref(), request.expiry)
        .await?;

    // The confirmed write is not counted against the quota. The refund is
    // skipped when the check never reached the store, so a bucket cannot be
    // created without its window TTL.
    if limiter_reachable {
        state.limiter.refund(client_ip).await;
    }

    let snapshot = state.limiter.snapshot(client_ip).await;

    Ok(ShortenResponse {
        url: link.target,
        short: format!("{}/{}", base.trim_end_matches('/'), link.code),
        expiry: link.expiry_hours,
        rate_limit: snapshot.remaining,
        rate_limit_reset: snapshot.reset.as_secs() / 60,
    })
}

/// Base URL the short link is built on: the configured public domain, or
/// the inbound request's own Host header when none is configured.
fn short_link_base(public_domain: Option<&str>, headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(domain) = public_domain {
        if domain.starts_with("http://") || domain.starts_with("https://") {
            return Ok(domain.to_string());
        }
        return Ok(format!("https://{}", domain));
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::bad_request("missing Host header"))?;

    Ok(format!("http://{}", host))
}

fn attach_rate_headers(response: &mut Response, decision: &RateLimitDecision) {
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(decision.remaining()),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-reset"),
        HeaderValue::from(decision.reset.as_secs()),
    );
}
