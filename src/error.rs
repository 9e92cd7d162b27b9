use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;

/// Application-level error returned by every handler.
///
/// Serializes to a flat `{"error": "..."}` JSON body; quota violations
/// additionally carry `rate_limit_reset` (minutes until the window resets).
#[derive(Debug)]
pub enum AppError {
    /// Malformed body, invalid URL, or other client input problem (400).
    BadRequest { message: String },
    /// Unknown short code (404).
    NotFound { message: String },
    /// Requested alias already maps to a URL (403).
    AliasTaken { message: String },
    /// Per-IP quota exhausted for the current window (429).
    RateLimited { message: String, reset: Duration },
    /// The target domain is not allowed to be shortened (503).
    TargetDenied { message: String },
    /// Store failure or other dependency problem (500).
    Internal { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }
    pub fn alias_taken(message: impl Into<String>) -> Self {
        Self::AliasTaken {
            message: message.into(),
        }
    }
    pub fn rate_limited(reset: Duration) -> Self {
        Self::RateLimited {
            message: "rate limit exceeded".to_string(),
            reset,
        }
    }
    pub fn target_denied(message: impl Into<String>) -> Self {
        Self::TargetDenied {
            message: message.into(),
        }
    }
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest { message }
            | Self::NotFound { message }
            | Self::AliasTaken { message }
            | Self::RateLimited { message, .. }
            | Self::TargetDenied { message }
            | Self::Internal { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, json!({ "error": message })),
            AppError::AliasTaken { message } => {
                (StatusCode::FORBIDDEN, json!({ "error": message }))
            }
            AppError::RateLimited { message, reset } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": message,
                    "rate_limit_reset": reset.as_secs() / 60,
                }),
            ),
            AppError::TargetDenied { message } => {
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": message }))
            }
            AppError::Internal { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };

        (status, Json(body)).into_response()
    }
}
