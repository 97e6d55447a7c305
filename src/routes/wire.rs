use serde::Serialize;

use super::model::{
    LatLng, PolylineEncoding, PolylineQuality, RouteModifiers, RoutingPreference, TravelMode,
    Units, Waypoint,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireWaypoint<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<WireLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    place_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireLocation {
    lat_lng: LatLng,
}

impl<'a> From<&'a Waypoint> for WireWaypoint<'a> {
    fn from(w: &'a Waypoint) -> Self {
        let mut out = WireWaypoint {
            location: None,
            place_id: None,
            address: None,
        };
        match w {
            Waypoint::Location(ll) => out.location = Some(WireLocation { lat_lng: *ll }),
            Waypoint::PlaceId(id) => out.place_id = Some(id.as_str()),
            Waypoint::Address(a) => out.address = Some(a.as_str()),
        }
        out
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ComputeRoutesBody<'a> {
    pub(crate) origin: WireWaypoint<'a>,
    pub(crate) destination: WireWaypoint<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) intermediates: Vec<WireWaypoint<'a>>,
    pub(crate) travel_mode: TravelMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) routing_preference: Option<RoutingPreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) departure_time: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub(crate) compute_alternative_routes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) route_modifiers: Option<RouteModifiers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) language_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) units: Option<Units>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub(crate) optimize_waypoint_order: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) polyline_quality: Option<PolylineQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) polyline_encoding: Option<PolylineEncoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) extra_computations: Option<&'a [String]>,
}

/// Matrix endpoints wrap each waypoint in a `RouteMatrixOrigin`/`RouteMatrixDestination`.
#[derive(Serialize)]
pub(crate) struct MatrixEntry<'a> {
    pub(crate) waypoint: WireWaypoint<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RouteMatrixBody<'a> {
    pub(crate) origins: Vec<MatrixEntry<'a>>,
    pub(crate) destinations: Vec<MatrixEntry<'a>>,
    pub(crate) travel_mode: TravelMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) routing_preference: Option<RoutingPreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) departure_time: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) language_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) units: Option<Units>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) extra_computations: Option<&'a [String]>,
}
