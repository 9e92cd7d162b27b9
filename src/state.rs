//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::application::rate_limiter::RateLimiter;
use crate::application::shortener::LinkService;
use crate::domain::store::KeyValueStore;

/// Application state shared across request tasks.
///
/// The store handle and the services built on it are explicit dependencies
/// constructed once at startup; there is no global store client. Tests
/// substitute the store with an in-memory double.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub limiter: Arc<RateLimiter>,
    pub links: Arc<LinkService>,
    /// Public domain used to build absolute short URLs; `None` derives the
    /// base from each request's Host header.
    pub public_domain: Option<String>,
}
