//! Shorten/resolve orchestration.
//!
//! A short link is a plain store entry: key = code, value = normalized
//! target URL, TTL = requested expiry. There is no update-in-place and no
//! explicit deletion; a link dies when its TTL elapses.

use crate::application::code_generator::{CodeGenError, CodeGenerator};
use crate::domain::store::KeyValueStore;
use crate::error::AppError;
use crate::utils::domain_guard::DomainGuard;
use crate::utils::url_norm::normalize_url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Global visit counter key. Incremented on every successful resolve,
/// never expired.
pub const VISIT_COUNTER_KEY: &str = "counter";

/// Expiry applied when the client sends none, or a non-positive one.
pub const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// A freshly persisted short link.
#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub code: String,
    pub target: String,
    pub expiry_hours: i64,
}

/// Creates and resolves short links against the store.
pub struct LinkService {
    store: Arc<dyn KeyValueStore>,
    codes: CodeGenerator,
    guard: DomainGuard,
}

impl LinkService {
    pub fn new(store: Arc<dyn KeyValueStore>, guard: DomainGuard) -> Self {
        let codes = CodeGenerator::new(store.clone());
        Self {
            store,
            codes,
            guard,
        }
    }

    /// Validates, normalizes, and persists a new short link.
    ///
    /// Steps: URL validation and scheme enforcement, target domain policy,
    /// expiry defaulting, code generation with collision check, and the
    /// final write with TTL. The collision check and the write are separate
    /// store calls; two racing requests for the same alias are resolved by
    /// last-write-wins (see DESIGN.md).
    pub async fn create_link(
        &self,
        raw_url: &str,
        alias: Option<&str>,
        expiry_hours: Option<i64>,
    ) -> Result<CreatedLink, AppError> {
        let target_url =
            normalize_url(raw_url).map_err(|e| AppError::bad_request(e.to_string()))?;

        if !self.guard.allows(&target_url) {
            return Err(AppError::target_denied("you cannot access this domain"));
        }

        let expiry_hours = expiry_hours
            .filter(|h| *h > 0)
            .unwrap_or(DEFAULT_EXPIRY_HOURS);

        let code = self.codes.generate(alias).await.map_err(map_codegen_error)?;

        let target = target_url.to_string();
        let ttl = Duration::from_secs(expiry_hours as u64 * 3600);

        if let Err(e) = self.store.set(&code, &target, ttl).await {
            error!(code = %code, error = %e, "failed to persist link");
            return Err(AppError::internal("unable to persist link"));
        }

        Ok(CreatedLink {
            code,
            target,
            expiry_hours,
        })
    }

    /// Looks up `code` and returns its target URL.
    ///
    /// Distinguishes an unknown (or expired) code from an unreachable
    /// store. The global visit counter is incremented best-effort; a failed
    /// increment never blocks the redirect.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        match self.store.get(code).await {
            Ok(Some(target)) => {
                if let Err(e) = self.store.increment(VISIT_COUNTER_KEY).await {
                    warn!(code = %code, error = %e, "visit counter increment failed");
                }
                Ok(target)
            }
            Ok(None) => Err(AppError::not_found("short not found in the database")),
            Err(e) => {
                error!(code = %code, error = %e, "store lookup failed");
                Err(AppError::internal("cannot connect to db"))
            }
        }
    }
}

fn map_codegen_error(e: CodeGenError) -> AppError {
    match e {
        CodeGenError::Collision => AppError::alias_taken("short code already in use"),
        CodeGenError::Reserved(alias) => {
            AppError::bad_request(format!("short code '{}' is reserved", alias))
        }
        CodeGenError::Entropy | CodeGenError::Exhausted => {
            AppError::internal("could not generate id")
        }
        CodeGenError::Store(err) => {
            error!(error = %err, "collision check failed");
            AppError::internal("cannot connect to db")
        }
    }
}
