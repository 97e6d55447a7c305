//! Public client surface + builder.
//! The request pipeline lives in `executor`; the policies it composes live in `cache`,
//! `circuit`, `rate_limit` and `retry`, and `constants` holds endpoints and header names.

pub mod cache;
pub mod circuit;
mod constants;
mod executor;
pub mod hooks;
pub mod rate_limit;
pub mod retry;

pub use cache::{CacheMode, TtlCache};
pub use circuit::{CircuitBreaker, CircuitState};
pub use constants::{API_KEY_HEADER, FIELD_MASK_HEADER, REQUEST_ID_HEADER};
pub use hooks::HookId;
pub use rate_limit::RateLimiter;
pub use retry::{Backoff, RetryConfig};

use crate::core::net::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
use crate::core::request::Request;
use crate::core::{BoxError, MapsError};
use constants::{
    API_KEY_ENV, DEFAULT_BASE_DIRECTIONS, DEFAULT_BASE_ROADS, DEFAULT_BASE_ROUTES,
    DEFAULT_COMPRESSION_THRESHOLD, DEFAULT_TIMEOUT_SECS, USER_AGENT,
};
use executor::Executor;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Client for the Routes, Directions and Roads APIs.
///
/// Cheap to clone: clones share one connection pool, one cache, one rate-limiter
/// identity and the same circuit breaker.
#[derive(Clone)]
pub struct MapsClient {
    inner: Arc<Executor>,
    api_key: Arc<str>,
    base_routes: Url,
    base_directions: Url,
    base_roads: Url,
}

impl fmt::Debug for MapsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapsClient")
            .field("api_key", &"***")
            .field("timeout", &self.inner.default_timeout)
            .field("base_routes", &self.base_routes.as_str())
            .field("base_directions", &self.base_directions.as_str())
            .field("base_roads", &self.base_roads.as_str())
            .finish_non_exhaustive()
    }
}

impl MapsClient {
    /// Create a new builder.
    pub fn builder() -> MapsClientBuilder {
        MapsClientBuilder::default()
    }

    /// Client with default settings for `api_key`.
    pub fn new(api_key: impl Into<String>) -> Result<Self, MapsError> {
        Self::builder().api_key(api_key).build()
    }

    /* -------- internal getters used by the API modules -------- */

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }
    pub(crate) fn base_routes(&self) -> &Url {
        &self.base_routes
    }
    pub(crate) fn base_directions(&self) -> &Url {
        &self.base_directions
    }
    pub(crate) fn base_roads(&self) -> &Url {
        &self.base_roads
    }

    /* -------- request pipeline -------- */

    /// Run `request` through rate limiting, caching, circuit breaking and retries.
    pub async fn execute(&self, request: Request) -> Result<Value, MapsError> {
        self.inner.execute(request, CacheMode::Use, None).await
    }

    /// Like [`execute`](Self::execute), with a per-call cache mode and retry policy.
    pub async fn execute_with(
        &self,
        request: Request,
        cache_mode: CacheMode,
        retry_override: Option<&RetryConfig>,
    ) -> Result<Value, MapsError> {
        self.inner.execute(request, cache_mode, retry_override).await
    }

    /* -------- policies -------- */

    pub fn cache_enabled(&self) -> bool {
        self.inner.cache.is_some()
    }

    pub fn cache(&self) -> Option<&TtlCache> {
        self.inner.cache.as_deref()
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.clear();
        }
    }

    pub fn rate_limiter(&self) -> Option<&RateLimiter> {
        self.inner.rate_limiter.as_deref()
    }

    /// Identity this client is tracked under by its rate limiter.
    pub fn identity(&self) -> &str {
        &self.inner.identity
    }

    pub fn circuit_breaker(&self) -> Option<&CircuitBreaker> {
        self.inner.breaker.as_deref()
    }

    pub fn retry_config(&self) -> Option<&RetryConfig> {
        self.inner.retry.as_ref()
    }

    /* -------- hooks -------- */

    /// Register a callback run before every attempt, in registration order.
    ///
    /// An `Err` or a panic from the hook is logged and never aborts the request. Panics
    /// are only caught when the crate is built with `panic = "unwind"`.
    pub fn add_request_hook(
        &self,
        hook: impl Fn(&TransportRequest) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> HookId {
        self.inner.hooks.add_request(Arc::new(hook))
    }

    /// Register a callback run on every raw response, before classification.
    ///
    /// Failures are handled as for [`add_request_hook`](Self::add_request_hook).
    pub fn add_response_hook(
        &self,
        hook: impl Fn(&TransportResponse) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> HookId {
        self.inner.hooks.add_response(Arc::new(hook))
    }

    /// Returns `false` if no hook with this id was registered.
    pub fn remove_hook(&self, id: HookId) -> bool {
        self.inner.hooks.remove(id)
    }

    pub fn clear_hooks(&self) {
        self.inner.hooks.clear();
    }

    pub fn hook_count(&self) -> usize {
        self.inner.hooks.len()
    }

    /* -------- shutdown -------- */

    /// Release pooled connections. Idempotent and safe to race with in-flight calls,
    /// which finish on the connections they already hold.
    pub fn close(&self) {
        self.inner.transport.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.transport.is_closed()
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct MapsClientBuilder {
    api_key: Option<String>,
    user_agent: Option<String>,
    base_routes: Option<Url>,
    base_directions: Option<Url>,
    base_roads: Option<Url>,

    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,

    rate_limit: Option<(usize, Duration)>,
    rate_limiter: Option<Arc<RateLimiter>>,
    identity: Option<String>,
    retry: Option<RetryConfig>,
    cache_ttl: Option<Duration>,
    cache_maxsize: Option<usize>,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
    compression_threshold: Option<usize>,
    transport: Option<Arc<dyn Transport>>,
}

impl MapsClientBuilder {
    /// API key. Defaults to the `GOOGLE_MAPS_API_KEY` environment variable.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the Routes API base (e.g., `https://routes.googleapis.com/`).
    pub fn base_routes(mut self, url: Url) -> Self {
        self.base_routes = Some(url);
        self
    }

    /// Override the Directions API base (e.g., `https://maps.googleapis.com/maps/api/directions/`).
    pub fn base_directions(mut self, url: Url) -> Self {
        self.base_directions = Some(url);
        self
    }

    /// Override the Roads API base (e.g., `https://roads.googleapis.com/v1/`).
    pub fn base_roads(mut self, url: Url) -> Self {
        self.base_roads = Some(url);
        self
    }

    /// Default per-attempt timeout. Default: 30s.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Admit at most `max_calls` calls per sliding `period`.
    pub fn rate_limit(mut self, max_calls: usize, period: Duration) -> Self {
        self.rate_limit = Some((max_calls, period));
        self
    }

    /// Share an existing rate limiter. Takes precedence over [`rate_limit`](Self::rate_limit).
    pub fn rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Rate-limiter identity for this client. Default: a random UUID.
    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Retry policy applied to every call. Default: no retries.
    pub fn retry(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    /// Shorthand for the default retry policy (`true`) or none (`false`).
    pub fn retry_enabled(mut self, enabled: bool) -> Self {
        self.retry = enabled.then(RetryConfig::default);
        self
    }

    /// Enable in-memory caching with a TTL and capacity.
    pub fn cache(mut self, ttl: Duration, maxsize: usize) -> Self {
        self.cache_ttl = Some(ttl);
        self.cache_maxsize = Some(maxsize);
        self
    }

    /// Enable in-memory caching with a TTL and the default capacity.
    /// If not set, caching is disabled.
    pub fn cache_ttl(mut self, dur: Duration) -> Self {
        self.cache_ttl = Some(dur);
        self
    }

    /// Share a circuit breaker, typically one per downstream API.
    pub fn circuit_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = Some(breaker);
        self
    }

    /// Gzip JSON bodies of at least `threshold` bytes.
    pub fn compression(mut self, threshold: usize) -> Self {
        self.compression_threshold = Some(threshold);
        self
    }

    /// Gzip JSON bodies of at least 1 KiB.
    pub fn enable_compression(self) -> Self {
        self.compression(DEFAULT_COMPRESSION_THRESHOLD)
    }

    /// Replace the default reqwest transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<MapsClient, MapsError> {
        let api_key = match self.api_key {
            Some(k) => k,
            None => std::env::var(API_KEY_ENV).map_err(|_| {
                MapsError::Config(format!("API key is required (or set {API_KEY_ENV})"))
            })?,
        };
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(MapsError::Config("API key cannot be empty".into()));
        }

        let base_routes = with_trailing_slash(
            self.base_routes
                .unwrap_or(Url::parse(DEFAULT_BASE_ROUTES)?),
        );
        let base_directions = with_trailing_slash(
            self.base_directions
                .unwrap_or(Url::parse(DEFAULT_BASE_DIRECTIONS)?),
        );
        let base_roads =
            with_trailing_slash(self.base_roads.unwrap_or(Url::parse(DEFAULT_BASE_ROADS)?));

        let default_timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if default_timeout.is_zero() {
            return Err(MapsError::Config("timeout must be positive".into()));
        }

        if let Some(cfg) = &self.retry {
            cfg.validate()?;
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => {
                let mut httpb = reqwest::Client::builder()
                    .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));
                if let Some(ct) = self.connect_timeout {
                    httpb = httpb.connect_timeout(ct);
                }
                Arc::new(ReqwestTransport::new(httpb.build()?))
            }
        };

        let rate_limiter = match (self.rate_limiter, self.rate_limit) {
            (Some(shared), _) => Some(shared),
            (None, Some((max_calls, period))) => Some(Arc::new(RateLimiter::new(max_calls, period)?)),
            (None, None) => None,
        };

        let cache = self
            .cache_ttl
            .map(|ttl| {
                TtlCache::new(
                    self.cache_maxsize.unwrap_or(TtlCache::<Value>::DEFAULT_MAXSIZE),
                    ttl,
                )
            })
            .transpose()?
            .map(Arc::new);

        let executor = Executor {
            transport,
            identity: self.identity.unwrap_or_else(|| Uuid::new_v4().to_string()),
            rate_limiter,
            cache,
            breaker: self.circuit_breaker,
            retry: self.retry,
            compression_threshold: self.compression_threshold,
            default_timeout,
            hooks: Default::default(),
        };

        Ok(MapsClient {
            inner: Arc::new(executor),
            api_key: Arc::from(api_key),
            base_routes,
            base_directions,
            base_roads,
        })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
