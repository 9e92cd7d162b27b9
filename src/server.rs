//! HTTP server initialization and runtime setup.
//!
//! Handles the store connection, service construction, and Axum server
//! lifecycle.

use crate::application::rate_limiter::RateLimiter;
use crate::application::shortener::LinkService;
use crate::config::Config;
use crate::domain::store::KeyValueStore;
use crate::infrastructure::redis_store::RedisStore;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::domain_guard::DomainGuard;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Redis connection (with a short startup retry)
/// - Rate limiter and link service
/// - Axum HTTP server with graceful shutdown on SIGINT
///
/// # Errors
///
/// Returns an error if:
/// - The store cannot be reached after the retries are exhausted
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = connect_store(&config.redis_url).await?;

    let limiter = Arc::new(RateLimiter::new(
        store.clone(),
        config.api_quota,
        config.rate_limit_window,
    ));

    let guard = DomainGuard::new(config.public_domain.as_deref(), &config.denylist);
    let links = Arc::new(LinkService::new(store.clone(), guard));

    let state = AppState {
        store,
        limiter,
        links,
        public_domain: config.public_domain.clone(),
    };

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Connects to the store, retrying a few times so the service survives a
/// store that comes up slightly later than it does (docker-compose races).
async fn connect_store(redis_url: &str) -> Result<Arc<dyn KeyValueStore>> {
    let strategy = ExponentialBackoff::from_millis(500).map(jitter).take(4);

    let store = Retry::spawn(strategy, || async {
        match RedisStore::connect(redis_url).await {
            Ok(store) => Ok(store),
            Err(e) => {
                tracing::warn!(error = %e, "store connection attempt failed");
                Err(e)
            }
        }
    })
    .await
    .context("could not connect to the key-value store")?;

    Ok(Arc::new(store))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown signal handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
