//! Roads API: snap GPS traces to roads, find nearest roads, look up speed limits.

mod api;

use std::time::Duration;

use serde_json::Value;

use crate::core::{
    MapsClient, MapsError,
    client::{CacheMode, RetryConfig},
    validate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    SnapToRoads,
    NearestRoads,
    SpeedLimits,
}

impl Endpoint {
    const fn path(self) -> &'static str {
        match self {
            Self::SnapToRoads => "snapToRoads",
            Self::NearestRoads => "nearestRoads",
            Self::SpeedLimits => "speedLimits",
        }
    }
}

/// A builder for the three Roads API endpoints.
///
/// Points are `(latitude, longitude)` pairs; at most 100 per request.
#[derive(Clone, Debug)]
pub struct RoadsBuilder {
    client: MapsClient,
    endpoint: Endpoint,
    points: Vec<(f64, f64)>,
    place_ids: Vec<String>,
    interpolate: bool,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
    timeout: Option<Duration>,
}

impl RoadsBuilder {
    fn new(client: &MapsClient, endpoint: Endpoint, points: Vec<(f64, f64)>) -> Self {
        Self {
            client: client.clone(),
            endpoint,
            points,
            place_ids: Vec::new(),
            interpolate: false,
            cache_mode: CacheMode::Use,
            retry_override: None,
            timeout: None,
        }
    }

    /// Snap a GPS trace to the roads most likely traveled.
    pub fn snap_to_roads(client: &MapsClient, path: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self::new(client, Endpoint::SnapToRoads, path.into_iter().collect())
    }

    /// Nearest road segment for each point; points need not form a path.
    pub fn nearest_roads(
        client: &MapsClient,
        points: impl IntoIterator<Item = (f64, f64)>,
    ) -> Self {
        Self::new(client, Endpoint::NearestRoads, points.into_iter().collect())
    }

    /// Posted speed limits, for either a [`path`](Self::path) or
    /// [`place_ids`](Self::place_ids), not both.
    pub fn speed_limits(client: &MapsClient) -> Self {
        Self::new(client, Endpoint::SpeedLimits, Vec::new())
    }

    /// Sets the cache mode for this specific API call.
    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Overrides the default retry policy for this specific API call.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Interpolate the snapped path along the full road geometry (`snapToRoads` only).
    #[must_use]
    pub const fn interpolate(mut self, yes: bool) -> Self {
        self.interpolate = yes;
        self
    }

    /// Path whose speed limits to look up (`speedLimits` only).
    #[must_use]
    pub fn path(mut self, path: impl IntoIterator<Item = (f64, f64)>) -> Self {
        self.points = path.into_iter().collect();
        self
    }

    /// Road segment place ids whose speed limits to look up (`speedLimits` only).
    #[must_use]
    pub fn place_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.place_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Executes the request and returns the API response.
    ///
    /// # Errors
    ///
    /// Returns `MapsError::InvalidArgument` for an empty or oversized point list, an
    /// out-of-range coordinate, or a speed limit query with both or neither of a path and
    /// place ids.
    #[tracing::instrument(skip(self), fields(endpoint = self.endpoint.path()), err)]
    pub async fn fetch(self) -> Result<Value, MapsError> {
        let params = self.params()?;
        api::fetch_roads(
            &self.client,
            self.endpoint.path(),
            params,
            self.cache_mode,
            self.retry_override.as_ref(),
            self.timeout,
        )
        .await
    }

    fn params(&self) -> Result<Vec<(&'static str, String)>, MapsError> {
        let mut params = Vec::new();
        match self.endpoint {
            Endpoint::SnapToRoads => {
                params.push(("path", validate::point_list(&self.points, "path")?));
                if self.interpolate {
                    params.push(("interpolate", "true".to_string()));
                }
            }
            Endpoint::NearestRoads => {
                params.push(("points", validate::point_list(&self.points, "points")?));
            }
            Endpoint::SpeedLimits => match (self.points.is_empty(), self.place_ids.is_empty()) {
                (false, false) => {
                    return Err(MapsError::InvalidArgument(
                        "either path or place_ids must be provided, not both".into(),
                    ));
                }
                (true, true) => {
                    return Err(MapsError::InvalidArgument(
                        "either path or place_ids must be provided".into(),
                    ));
                }
                (false, true) => {
                    params.push(("path", validate::point_list(&self.points, "path")?));
                }
                (true, false) => {
                    validate::at_most(&self.place_ids, validate::MAX_ROADS_POINTS, "place ids")?;
                    let ids = self
                        .place_ids
                        .iter()
                        .map(|id| validate::non_empty(id, "place id"))
                        .collect::<Result<Vec<_>, _>>()?;
                    params.push(("placeId", ids.join(",")));
                }
            },
        }
        Ok(params)
    }
}

impl MapsClient {
    /// Start a `snapToRoads` request.
    pub fn snap_to_roads(&self, path: impl IntoIterator<Item = (f64, f64)>) -> RoadsBuilder {
        RoadsBuilder::snap_to_roads(self, path)
    }

    /// Start a `nearestRoads` request.
    pub fn nearest_roads(&self, points: impl IntoIterator<Item = (f64, f64)>) -> RoadsBuilder {
        RoadsBuilder::nearest_roads(self, points)
    }

    /// Start a `speedLimits` request; add a path or place ids before fetching.
    pub fn speed_limits(&self) -> RoadsBuilder {
        RoadsBuilder::speed_limits(self)
    }
}
