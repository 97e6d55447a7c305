use serde::{Deserialize, Serialize};

use crate::core::{MapsError, validate};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Where a route starts, ends or passes through.
#[derive(Debug, Clone, PartialEq)]
pub enum Waypoint {
    /// A coordinate, sent as `location.latLng`.
    Location(LatLng),
    /// A Google place id.
    PlaceId(String),
    /// A free-form address geocoded by the API.
    Address(String),
}

impl Waypoint {
    pub const fn lat_lng(latitude: f64, longitude: f64) -> Self {
        Self::Location(LatLng::new(latitude, longitude))
    }

    pub fn place_id(id: impl Into<String>) -> Self {
        Self::PlaceId(id.into())
    }

    pub fn address(address: impl Into<String>) -> Self {
        Self::Address(address.into())
    }

    pub(crate) fn validate(&self, field: &str) -> Result<(), MapsError> {
        match self {
            Self::Location(ll) => validate::coordinate(ll.latitude, ll.longitude),
            Self::PlaceId(s) | Self::Address(s) => validate::non_empty(s, field).map(|_| ()),
        }
    }
}

impl From<LatLng> for Waypoint {
    fn from(ll: LatLng) -> Self {
        Self::Location(ll)
    }
}

/// Mode of transport for a Routes API request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelMode {
    #[default]
    Drive,
    Bicycle,
    Walk,
    TwoWheeler,
    Transit,
}

/// How much traffic information the route computation takes into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingPreference {
    TrafficUnaware,
    TrafficAware,
    TrafficAwareOptimal,
}

/// Unit system used for display values in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Units {
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolylineQuality {
    HighQuality,
    Overview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolylineEncoding {
    EncodedPolyline,
    GeoJsonLinestring,
}

/// Road features to avoid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteModifiers {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub avoid_tolls: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub avoid_highways: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub avoid_ferries: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub avoid_indoor: bool,
}
