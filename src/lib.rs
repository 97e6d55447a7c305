//! google-maps-rs: resilient async client for the Google Maps Routes, Directions and Roads APIs.
//!
//! Every call runs through one pipeline: client-side rate limiting, an in-memory TTL
//! cache, an optional circuit breaker and retries with exponential backoff. Failures are
//! classified into [`ApiError`] values carrying the HTTP status, the normalized response
//! body and the correlation id of the last attempt.
//!
//! ```no_run
//! # async fn run() -> Result<(), google_maps_rs::MapsError> {
//! use std::time::Duration;
//! use google_maps_rs::{MapsClient, RetryConfig, routes::Waypoint};
//!
//! let client = MapsClient::builder()
//!     .api_key("YOUR_KEY")
//!     .retry(RetryConfig::default())
//!     .cache_ttl(Duration::from_secs(300))
//!     .build()?;
//!
//! let routes = client
//!     .compute_routes(Waypoint::lat_lng(37.4197, -122.0827), Waypoint::address("Mountain View, CA"))
//!     .field_mask("routes.duration,routes.distanceMeters")
//!     .fetch()
//!     .await?;
//! println!("{routes}");
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod directions;
pub mod roads;
pub mod routes;

pub use crate::core::client::{
    API_KEY_HEADER, Backoff, CircuitBreaker, CircuitState, FIELD_MASK_HEADER, HookId,
    REQUEST_ID_HEADER, RateLimiter, TtlCache,
};
pub use crate::core::net::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
pub use crate::core::{
    ApiError, CacheMode, ErrorKind, MapsClient, MapsClientBuilder, MapsError, NetworkFailure,
    Request, RetryConfig,
};
pub use directions::DirectionsBuilder;
pub use roads::RoadsBuilder;
pub use routes::{ComputeRoutesBuilder, RouteMatrixBuilder};

/// Install a `tracing` subscriber honoring `RUST_LOG`, for tests and examples.
///
/// Safe to call more than once; later calls are no-ops.
#[cfg(feature = "tracing-subscriber")]
pub fn init_tracing_for_tests() {
    use tracing_subscriber::{EnvFilter, fmt};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
