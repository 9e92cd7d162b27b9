//! DTOs for the link shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The target URL. A missing scheme is defaulted to `https://`.
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,

    /// Optional custom short code. Used verbatim after trimming; an alias
    /// that already maps to a URL is rejected, never overwritten.
    #[serde(default)]
    pub short: Option<String>,

    /// Optional expiry in hours. Absent or non-positive defaults to 24.
    #[serde(default)]
    pub expiry: Option<i64>,
}

/// Response for a successfully created short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    /// The normalized target URL that was stored.
    pub url: String,

    /// The absolute short URL.
    pub short: String,

    /// Effective expiry in hours.
    pub expiry: i64,

    /// Quota left in the caller's current rate window, re-read after the
    /// refund. Zero when the re-read failed.
    pub rate_limit: i64,

    /// Minutes until the caller's rate window resets. Zero when the
    /// re-read failed.
    pub rate_limit_reset: u64,
}
