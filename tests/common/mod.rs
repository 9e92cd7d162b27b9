#![allow(dead_code)]

use axum::extract::ConnectInfo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use urlshort::application::rate_limiter::RateLimiter;
use urlshort::application::shortener::LinkService;
use urlshort::domain::store::KeyValueStore;
use urlshort::infrastructure::memory_store::MemoryStore;
use urlshort::state::AppState;
use urlshort::utils::domain_guard::DomainGuard;

pub const TEST_WINDOW: Duration = Duration::from_secs(1800);

/// Builds an [`AppState`] over a fresh in-memory store and hands the store
/// back for seeding, TTL control, and failure injection.
pub fn create_test_state(quota: i64, public_domain: Option<&str>) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let kv: Arc<dyn KeyValueStore> = store.clone();

    let limiter = Arc::new(RateLimiter::new(kv.clone(), quota, TEST_WINDOW));
    let guard = DomainGuard::new(public_domain, &[]);
    let links = Arc::new(LinkService::new(kv.clone(), guard));

    let state = AppState {
        store: kv,
        limiter,
        links,
        public_domain: public_domain.map(|d| d.to_string()),
    };

    (state, store)
}

/// Injects a fixed peer address so handlers using `ConnectInfo` work under
/// `TestServer`.
#[derive(Clone)]
pub struct MockConnectInfoLayer(pub SocketAddr);

impl MockConnectInfoLayer {
    pub fn with_ip(ip: &str) -> Self {
        Self(format!("{}:12345", ip).parse().unwrap())
    }
}

impl<S> tower::Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.0,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: SocketAddr,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(self.addr));
        self.inner.call(req)
    }
}
