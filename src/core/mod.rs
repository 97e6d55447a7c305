//! Core components of the `google-maps-rs` client.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The main [`MapsClient`] and its builder.
//! - The primary [`MapsError`] type and the typed [`ApiError`].
//! - The resilient request pipeline: rate limiting, caching, circuit breaking and retries.
//! - The pluggable HTTP [`Transport`](net::Transport) and response classification.

/// Response normalization (JSON, XML, plain text) and error classification.
pub mod classify;
/// The main client (`MapsClient`), builder, and pipeline policies.
pub mod client;
/// The primary error type (`MapsError`) for the crate.
pub mod error;
/// The HTTP transport seam and its reqwest implementation.
pub mod net;
/// The logical request value handed to the pipeline.
pub mod request;
pub(crate) mod validate;

// convenient re-exports so most code can just `use crate::core::MapsClient`
pub use client::{CacheMode, MapsClient, MapsClientBuilder, RetryConfig};
pub use error::{ApiError, BoxError, ErrorKind, MapsError, NetworkFailure};
pub use request::{ParamValue, Request};
