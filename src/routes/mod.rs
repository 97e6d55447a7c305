//! Routes API: traffic-aware routes and route matrices.

mod api;
mod model;
mod wire;

pub use model::{
    LatLng, PolylineEncoding, PolylineQuality, RouteModifiers, RoutingPreference, TravelMode,
    Units, Waypoint,
};

use std::time::Duration;

use serde_json::Value;

use crate::core::{
    MapsClient, MapsError,
    client::{CacheMode, RetryConfig},
    validate,
};
use wire::{ComputeRoutesBody, MatrixEntry, RouteMatrixBody, WireWaypoint};

/// A builder for `directions/v2:computeRoutes`.
///
/// The Routes API rejects requests without a response field mask; set one with
/// [`field_mask`](Self::field_mask) (e.g. `routes.duration,routes.distanceMeters`).
#[derive(Clone, Debug)]
pub struct ComputeRoutesBuilder {
    client: MapsClient,
    origin: Waypoint,
    destination: Waypoint,
    intermediates: Vec<Waypoint>,
    travel_mode: TravelMode,
    routing_preference: Option<RoutingPreference>,
    departure_time: Option<String>,
    compute_alternative_routes: bool,
    route_modifiers: Option<RouteModifiers>,
    language_code: Option<String>,
    units: Option<Units>,
    optimize_waypoint_order: bool,
    polyline_quality: Option<PolylineQuality>,
    polyline_encoding: Option<PolylineEncoding>,
    extra_computations: Vec<String>,
    field_mask: Option<String>,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
    timeout: Option<Duration>,
}

impl ComputeRoutesBuilder {
    /// Creates a new `ComputeRoutesBuilder` between two waypoints.
    pub fn new(
        client: &MapsClient,
        origin: impl Into<Waypoint>,
        destination: impl Into<Waypoint>,
    ) -> Self {
        Self {
            client: client.clone(),
            origin: origin.into(),
            destination: destination.into(),
            intermediates: Vec::new(),
            travel_mode: TravelMode::default(),
            routing_preference: None,
            departure_time: None,
            compute_alternative_routes: false,
            route_modifiers: None,
            language_code: None,
            units: None,
            optimize_waypoint_order: false,
            polyline_quality: None,
            polyline_encoding: None,
            extra_computations: Vec::new(),
            field_mask: None,
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

    /// Overrides the client timeout for this call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Up to 25 waypoints between origin and destination.
    #[must_use]
    pub fn intermediates(mut self, waypoints: impl IntoIterator<Item = Waypoint>) -> Self {
        self.intermediates = waypoints.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn travel_mode(mut self, mode: TravelMode) -> Self {
        self.travel_mode = mode;
        self
    }

    #[must_use]
    pub const fn routing_preference(mut self, pref: RoutingPreference) -> Self {
        self.routing_preference = Some(pref);
        self
    }

    /// RFC 3339 timestamp, e.g. `2026-10-16T15:01:23Z`.
    #[must_use]
    pub fn departure_time(mut self, time: impl Into<String>) -> Self {
        self.departure_time = Some(time.into());
        self
    }

    #[must_use]
    pub const fn compute_alternative_routes(mut self, yes: bool) -> Self {
        self.compute_alternative_routes = yes;
        self
    }

    #[must_use]
    pub const fn route_modifiers(mut self, modifiers: RouteModifiers) -> Self {
        self.route_modifiers = Some(modifiers);
        self
    }

    /// BCP-47 language code, e.g. `en-US`.
    #[must_use]
    pub fn language_code(mut self, code: impl Into<String>) -> Self {
        self.language_code = Some(code.into());
        self
    }

    #[must_use]
    pub const fn units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    #[must_use]
    pub const fn optimize_waypoint_order(mut self, yes: bool) -> Self {
        self.optimize_waypoint_order = yes;
        self
    }

    #[must_use]
    pub const fn polyline_quality(mut self, quality: PolylineQuality) -> Self {
        self.polyline_quality = Some(quality);
        self
    }

    #[must_use]
    pub const fn polyline_encoding(mut self, encoding: PolylineEncoding) -> Self {
        self.polyline_encoding = Some(encoding);
        self
    }

    /// Extra computations such as `TOLLS` or `FUEL_CONSUMPTION`.
    #[must_use]
    pub fn extra_computations<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_computations = items.into_iter().map(Into::into).collect();
        self
    }

    /// Response field mask sent as `X-Goog-FieldMask`.
    #[must_use]
    pub fn field_mask(mut self, mask: impl Into<String>) -> Self {
        self.field_mask = Some(mask.into());
        self
    }

    /// Executes the request and returns the API response.
    ///
    /// # Errors
    ///
    /// Returns `MapsError::InvalidArgument` for out-of-range coordinates, empty place ids or
    /// addresses, or more than 25 intermediates, without contacting the API. Otherwise any
    /// error of the request pipeline.
    #[tracing::instrument(skip(self), fields(travel_mode = ?self.travel_mode), err)]
    pub async fn fetch(self) -> Result<Value, MapsError> {
        self.origin.validate("origin")?;
        self.destination.validate("destination")?;
        validate::at_most(&self.intermediates, validate::MAX_WAYPOINTS, "intermediates")?;
        for w in &self.intermediates {
            w.validate("intermediate")?;
        }

        let body = ComputeRoutesBody {
            origin: WireWaypoint::from(&self.origin),
            destination: WireWaypoint::from(&self.destination),
            intermediates: self.intermediates.iter().map(WireWaypoint::from).collect(),
            travel_mode: self.travel_mode,
            routing_preference: self.routing_preference,
            departure_time: self.departure_time.as_deref(),
            compute_alternative_routes: self.compute_alternative_routes,
            route_modifiers: self.route_modifiers,
            language_code: self.language_code.as_deref(),
            units: self.units,
            optimize_waypoint_order: self.optimize_waypoint_order,
            polyline_quality: self.polyline_quality,
            polyline_encoding: self.polyline_encoding,
            extra_computations: (!self.extra_computations.is_empty())
                .then_some(self.extra_computations.as_slice()),
        };

        api::post(
            &self.client,
            api::COMPUTE_ROUTES_PATH,
            &body,
            self.field_mask.as_deref(),
            self.cache_mode,
            self.retry_override.as_ref(),
            self.timeout,
        )
        .await
    }
}

/// A builder for `distanceMatrix/v2:computeRouteMatrix`.
#[derive(Clone, Debug)]
pub struct RouteMatrixBuilder {
    client: MapsClient,
    origins: Vec<Waypoint>,
    destinations: Vec<Waypoint>,
    travel_mode: TravelMode,
    routing_preference: Option<RoutingPreference>,
    departure_time: Option<String>,
    language_code: Option<String>,
    units: Option<Units>,
    extra_computations: Vec<String>,
    field_mask: Option<String>,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
    timeout: Option<Duration>,
}

impl RouteMatrixBuilder {
    /// Creates a new `RouteMatrixBuilder` for 1..=50 origins and 1..=50 destinations.
    pub fn new(
        client: &MapsClient,
        origins: impl IntoIterator<Item = Waypoint>,
        destinations: impl IntoIterator<Item = Waypoint>,
    ) -> Self {
        Self {
            client: client.clone(),
            origins: origins.into_iter().collect(),
            destinations: destinations.into_iter().collect(),
            travel_mode: TravelMode::default(),
            routing_preference: None,
            departure_time: None,
            language_code: None,
            units: None,
            extra_computations: Vec::new(),
            field_mask: None,
            cache_mode: CacheMode::Use,
            retry_override: None,
            timeout: None,
        }
    }

    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

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
    pub const fn travel_mode(mut self, mode: TravelMode) -> Self {
        self.travel_mode = mode;
        self
    }

    #[must_use]
    pub const fn routing_preference(mut self, pref: RoutingPreference) -> Self {
        self.routing_preference = Some(pref);
        self
    }

    #[must_use]
    pub fn departure_time(mut self, time: impl Into<String>) -> Self {
        self.departure_time = Some(time.into());
        self
    }

    #[must_use]
    pub fn language_code(mut self, code: impl Into<String>) -> Self {
        self.language_code = Some(code.into());
        self
    }

    #[must_use]
    pub const fn units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    #[must_use]
    pub fn extra_computations<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_computations = items.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn field_mask(mut self, mask: impl Into<String>) -> Self {
        self.field_mask = Some(mask.into());
        self
    }

    /// Executes the request and returns the matrix elements as sent by the API.
    ///
    /// # Errors
    ///
    /// Returns `MapsError::InvalidArgument` when either list is empty, longer than 50,
    /// or contains an invalid waypoint.
    #[tracing::instrument(
        skip(self),
        fields(origins = self.origins.len(), destinations = self.destinations.len()),
        err
    )]
    pub async fn fetch(self) -> Result<Value, MapsError> {
        if self.origins.is_empty() {
            return Err(MapsError::InvalidArgument("origins list cannot be empty".into()));
        }
        if self.destinations.is_empty() {
            return Err(MapsError::InvalidArgument(
                "destinations list cannot be empty".into(),
            ));
        }
        validate::at_most(&self.origins, validate::MAX_MATRIX_ORIGINS, "origins")?;
        validate::at_most(
            &self.destinations,
            validate::MAX_MATRIX_DESTINATIONS,
            "destinations",
        )?;
        for w in &self.origins {
            w.validate("origin")?;
        }
        for w in &self.destinations {
            w.validate("destination")?;
        }

        let body = RouteMatrixBody {
            origins: matrix_entries(&self.origins),
            destinations: matrix_entries(&self.destinations),
            travel_mode: self.travel_mode,
            routing_preference: self.routing_preference,
            departure_time: self.departure_time.as_deref(),
            language_code: self.language_code.as_deref(),
            units: self.units,
            extra_computations: (!self.extra_computations.is_empty())
                .then_some(self.extra_computations.as_slice()),
        };

        api::post(
            &self.client,
            api::ROUTE_MATRIX_PATH,
            &body,
            self.field_mask.as_deref(),
            self.cache_mode,
            self.retry_override.as_ref(),
            self.timeout,
        )
        .await
    }
}

fn matrix_entries(list: &[Waypoint]) -> Vec<MatrixEntry<'_>> {
    list.iter()
        .map(|w| MatrixEntry {
            waypoint: WireWaypoint::from(w),
        })
        .collect()
}

impl MapsClient {
    /// Start a `computeRoutes` request between two waypoints.
    pub fn compute_routes(
        &self,
        origin: impl Into<Waypoint>,
        destination: impl Into<Waypoint>,
    ) -> ComputeRoutesBuilder {
        ComputeRoutesBuilder::new(self, origin, destination)
    }

    /// Start a `computeRouteMatrix` request.
    pub fn route_matrix(
        &self,
        origins: impl IntoIterator<Item = Waypoint>,
        destinations: impl IntoIterator<Item = Waypoint>,
    ) -> RouteMatrixBuilder {
        RouteMatrixBuilder::new(self, origins, destinations)
    }
}
