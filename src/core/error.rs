use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Boxed error used for causes and hook failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum MapsError {
    /// The API (or the transport underneath it) reported a failure.
    #[error(transparent)]
    Api(Box<ApiError>),

    /// The circuit breaker refused the call without contacting the API.
    #[error("circuit breaker is open; retry in {:.1}s", .remaining.as_secs_f64())]
    CircuitOpen {
        /// Cool-down left before the breaker lets a probe request through.
        remaining: Duration,
    },

    /// The client-side rate limiter refused the call before any network activity.
    #[error(
        "rate limit exceeded: {max_calls} calls per {:.1}s; retry after {:.2}s",
        .period.as_secs_f64(),
        .retry_after.as_secs_f64()
    )]
    RateLimited {
        /// Calls admitted per window.
        max_calls: usize,
        /// Length of the sliding window.
        period: Duration,
        /// Time until the oldest call in the window expires.
        retry_after: Duration,
    },

    /// A request could not be built from the given arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The client or one of its policies was configured with invalid values.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A request payload could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MapsError {
    /// Coarse classification of this error.
    ///
    /// Rate-limiter refusals report [`ErrorKind::QuotaExceeded`]; circuit breaker refusals
    /// and configuration problems report [`ErrorKind::Generic`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Api(e) => e.kind,
            Self::RateLimited { .. } => ErrorKind::QuotaExceeded,
            Self::InvalidArgument(_) => ErrorKind::InvalidRequest,
            _ => ErrorKind::Generic,
        }
    }

    /// The typed API error, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        self.as_api().and_then(|e| e.status)
    }

    /// Correlation id (`X-Request-ID`) of the last attempt, if one was made.
    pub fn correlation_id(&self) -> Option<&str> {
        self.as_api().and_then(|e| e.correlation_id.as_deref())
    }

    /// Whether the retry policy would consider this failure transient.
    pub fn is_retryable(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_retryable)
    }
}

impl From<ApiError> for MapsError {
    fn from(e: ApiError) -> Self {
        Self::Api(Box::new(e))
    }
}

/// Discriminant of an [`ApiError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// HTTP 400 or `INVALID_REQUEST`.
    InvalidRequest,
    /// HTTP 403 or `REQUEST_DENIED`.
    PermissionDenied,
    /// HTTP 404, `NOT_FOUND` or `ZERO_RESULTS`.
    NotFound,
    /// HTTP 429 or `OVER_QUERY_LIMIT`.
    QuotaExceeded,
    /// HTTP 5xx.
    InternalServer,
    /// Anything else, including network failures.
    Generic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidRequest => "invalid request",
            Self::PermissionDenied => "permission denied",
            Self::NotFound => "not found",
            Self::QuotaExceeded => "quota exceeded",
            Self::InternalServer => "internal server error",
            Self::Generic => "API error",
        })
    }
}

/// A classified failure of one logical API call.
#[derive(Debug)]
pub struct ApiError {
    /// What kind of failure this is.
    pub kind: ErrorKind,
    /// Human-readable message, taken from the API response when available.
    pub message: String,
    /// HTTP status code of the failing response.
    pub status: Option<u16>,
    /// The normalized response body.
    pub response: Option<Value>,
    /// The `X-Request-ID` sent with the last attempt.
    pub correlation_id: Option<String>,
    /// Number of attempts made before giving up.
    pub attempts: u32,
    source: Option<BoxError>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            response: None,
            correlation_id: None,
            attempts: 1,
            source: None,
        }
    }

    /// Wrap a transport failure as a generic error, keeping it as the cause.
    pub fn network(failure: NetworkFailure) -> Self {
        Self::new(ErrorKind::Generic, format!("Request failed: {failure}")).with_source(failure)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_response(mut self, response: Value) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a correlation id unless one is already present.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        if self.correlation_id.is_none() {
            self.correlation_id = Some(id.into());
        }
        self
    }

    pub(crate) fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// The transport failure behind this error, if it was a network-level failure.
    pub fn network_failure(&self) -> Option<&NetworkFailure> {
        self.source.as_ref()?.downcast_ref::<NetworkFailure>()
    }

    /// Retryable iff this wraps a transient network failure or an unclassified/internal 5xx.
    pub fn is_retryable(&self) -> bool {
        if let Some(failure) = self.network_failure() {
            return failure.is_transient();
        }
        crate::core::client::retry::should_retry(None, self.status)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {status})")?;
        }
        write!(f, ": {}", self.message)?;
        if self.attempts > 1 {
            write!(f, " after {} attempts", self.attempts)?;
        }
        if let Some(id) = &self.correlation_id {
            write!(f, " [request id {id}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// A transport-level failure: no HTTP response was obtained.
#[derive(Debug, Error)]
pub enum NetworkFailure {
    /// The attempt exceeded its timeout.
    #[error("request timed out: {0}")]
    Timeout(#[source] BoxError),

    /// The connection could not be established (refused, DNS, TLS).
    #[error("connection failed: {0}")]
    Connect(#[source] BoxError),

    /// The transport was shut down with `close()`.
    #[error("transport is closed")]
    Closed,

    /// Any other I/O failure while sending or reading the response.
    #[error("transport error: {0}")]
    Other(#[source] BoxError),
}

impl NetworkFailure {
    /// Timeouts and connection failures may succeed on a fresh attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connect(_))
    }
}

impl From<reqwest::Error> for NetworkFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(Box::new(e))
        } else if e.is_connect() {
            Self::Connect(Box::new(e))
        } else {
            Self::Other(Box::new(e))
        }
    }
}
