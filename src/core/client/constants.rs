//! Centralized constants for default endpoints, headers and UA.

/// Default UA sent with every request.
pub(crate) const USER_AGENT: &str = concat!("google-maps-rs/", env!("CARGO_PKG_VERSION"));

/// Routes API base (`directions/v2:computeRoutes`, `distanceMatrix/v2:computeRouteMatrix`).
pub(crate) const DEFAULT_BASE_ROUTES: &str = "https://routes.googleapis.com/";

/// Directions API (legacy) base; the output format (`json` / `xml`) is appended.
pub(crate) const DEFAULT_BASE_DIRECTIONS: &str = "https://maps.googleapis.com/maps/api/directions/";

/// Roads API base (`snapToRoads`, `nearestRoads`, `speedLimits`).
pub(crate) const DEFAULT_BASE_ROADS: &str = "https://roads.googleapis.com/v1/";

/// Environment variable consulted when no API key is given to the builder.
pub(crate) const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Default per-attempt timeout.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default minimum body size, in bytes, for gzip request compression.
pub(crate) const DEFAULT_COMPRESSION_THRESHOLD: usize = 1024;

/// Correlation id header, regenerated for every attempt.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// API key header used by the Routes API.
pub const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Response field mask header used by the Routes API.
pub const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";

pub(crate) const CONTENT_ENCODING_HEADER: &str = "Content-Encoding";
pub(crate) const CONTENT_TYPE_HEADER: &str = "Content-Type";
