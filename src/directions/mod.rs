//! Directions API (legacy): directions between two places as JSON or XML.

mod api;
mod model;

pub use model::{
    Avoid, DepartureTime, DirectionsMode, OutputFormat, TrafficModel, TransitMode,
    TransitRoutingPreference, UnitSystem,
};

use std::time::Duration;

use serde_json::Value;

use crate::core::{
    MapsClient, MapsError,
    client::{CacheMode, RetryConfig},
    validate,
};
use model::join_pipe;

/// A builder for fetching directions from the legacy Directions API.
#[derive(Clone, Debug)]
pub struct DirectionsBuilder {
    client: MapsClient,
    origin: String,
    destination: String,
    mode: DirectionsMode,
    waypoints: Vec<String>,
    alternatives: bool,
    avoid: Vec<Avoid>,
    language: Option<String>,
    units: Option<UnitSystem>,
    region: Option<String>,
    departure_time: Option<DepartureTime>,
    arrival_time: Option<i64>,
    traffic_model: Option<TrafficModel>,
    transit_mode: Vec<TransitMode>,
    transit_routing_preference: Option<TransitRoutingPreference>,
    format: OutputFormat,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
    timeout: Option<Duration>,
}

impl DirectionsBuilder {
    /// Creates a new `DirectionsBuilder`. Origin and destination may be addresses,
    /// `place_id:...` references or `lat,lng` strings.
    pub fn new(
        client: &MapsClient,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            client: client.clone(),
            origin: origin.into(),
            destination: destination.into(),
            mode: DirectionsMode::default(),
            waypoints: Vec::new(),
            alternatives: false,
            avoid: Vec::new(),
            language: None,
            units: None,
            region: None,
            departure_time: None,
            arrival_time: None,
            traffic_model: None,
            transit_mode: Vec::new(),
            transit_routing_preference: None,
            format: OutputFormat::default(),
            cache_mode: CacheMode::Use,
            retry_override: None,
            timeout: None,
        }
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

    #[must_use]
    pub const fn mode(mut self, mode: DirectionsMode) -> Self {
        self.mode = mode;
        self
    }

    /// Up to 25 intermediate stops, sent as one `|`-separated parameter.
    #[must_use]
    pub fn waypoints<I, S>(mut self, waypoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.waypoints = waypoints.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn alternatives(mut self, yes: bool) -> Self {
        self.alternatives = yes;
        self
    }

    #[must_use]
    pub fn avoid(mut self, features: impl IntoIterator<Item = Avoid>) -> Self {
        self.avoid = features.into_iter().collect();
        self
    }

    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub const fn units(mut self, units: UnitSystem) -> Self {
        self.units = Some(units);
        self
    }

    /// Region bias as a ccTLD, e.g. `us` or `gb`.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub const fn departure_time(mut self, time: DepartureTime) -> Self {
        self.departure_time = Some(time);
        self
    }

    /// Arrival time in seconds since the Unix epoch.
    #[must_use]
    pub const fn arrival_time(mut self, unix_seconds: i64) -> Self {
        self.arrival_time = Some(unix_seconds);
        self
    }

    #[must_use]
    pub const fn traffic_model(mut self, model: TrafficModel) -> Self {
        self.traffic_model = Some(model);
        self
    }

    #[must_use]
    pub fn transit_mode(mut self, modes: impl IntoIterator<Item = TransitMode>) -> Self {
        self.transit_mode = modes.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn transit_routing_preference(mut self, pref: TransitRoutingPreference) -> Self {
        self.transit_routing_preference = Some(pref);
        self
    }

    /// Response format. Default: JSON.
    #[must_use]
    pub const fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Executes the request and returns the directions response.
    ///
    /// # Errors
    ///
    /// Returns `MapsError::InvalidArgument` for an empty origin, destination or waypoint, or
    /// more than 25 waypoints. A body `status` other than `OK` (for example `ZERO_RESULTS`)
    /// is reported as `MapsError::Api`.
    #[tracing::instrument(skip(self), fields(mode = self.mode.as_str()), err)]
    pub async fn fetch(self) -> Result<Value, MapsError> {
        let params = self.params()?;
        api::fetch_directions(
            &self.client,
            self.format,
            params,
            self.cache_mode,
            self.retry_override.as_ref(),
            self.timeout,
        )
        .await
    }

    fn params(&self) -> Result<Vec<(&'static str, String)>, MapsError> {
        let origin = validate::non_empty(&self.origin, "origin")?;
        let destination = validate::non_empty(&self.destination, "destination")?;
        validate::at_most(&self.waypoints, validate::MAX_WAYPOINTS, "waypoints")?;

        let mut params = vec![
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("mode", self.mode.as_str().to_string()),
        ];
        if !self.waypoints.is_empty() {
            let stops = self
                .waypoints
                .iter()
                .map(|w| validate::non_empty(w, "waypoint"))
                .collect::<Result<Vec<_>, _>>()?;
            params.push(("waypoints", stops.join("|")));
        }
        if self.alternatives {
            params.push(("alternatives", "true".to_string()));
        }
        if !self.avoid.is_empty() {
            params.push(("avoid", join_pipe(&self.avoid, Avoid::as_str)));
        }
        if let Some(language) = &self.language {
            params.push(("language", validate::non_empty(language, "language")?.to_string()));
        }
        if let Some(units) = self.units {
            params.push(("units", units.as_str().to_string()));
        }
        if let Some(region) = &self.region {
            params.push(("region", region.clone()));
        }
        if let Some(departure) = self.departure_time {
            params.push(("departure_time", departure.to_param()));
        }
        if let Some(arrival) = self.arrival_time {
            params.push(("arrival_time", arrival.to_string()));
        }
        if let Some(model) = self.traffic_model {
            params.push(("traffic_model", model.as_str().to_string()));
        }
        if !self.transit_mode.is_empty() {
            params.push(("transit_mode", join_pipe(&self.transit_mode, TransitMode::as_str)));
        }
        if let Some(pref) = self.transit_routing_preference {
            params.push(("transit_routing_preference", pref.as_str().to_string()));
        }
        Ok(params)
    }
}

impl MapsClient {
    /// Start a Directions API request.
    pub fn directions(
        &self,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> DirectionsBuilder {
        DirectionsBuilder::new(self, origin, destination)
    }
}
