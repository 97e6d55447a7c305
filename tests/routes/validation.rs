use std::sync::Arc;

use google_maps_rs::MapsError;
use google_maps_rs::routes::Waypoint;

use crate::common::{ScriptedTransport, scripted_client};

fn client() -> (Arc<ScriptedTransport>, google_maps_rs::MapsClient) {
    let transport = ScriptedTransport::empty();
    let client = scripted_client(&transport).build().unwrap();
    (transport, client)
}

#[tokio::test]
async fn out_of_range_coordinates_are_rejected_locally() {
    let (transport, client) = client();

    let err = client
        .compute_routes(Waypoint::lat_lng(91.0, 0.0), Waypoint::lat_lng(0.0, 0.0))
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, MapsError::InvalidArgument(_)));

    let err = client
        .compute_routes(Waypoint::lat_lng(0.0, 0.0), Waypoint::lat_lng(0.0, 180.5))
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, MapsError::InvalidArgument(_)));

    assert_eq!(transport.sends(), 0);
}

#[tokio::test]
async fn intermediates_are_capped_at_25() {
    let (transport, client) = client();
    let stops = |n: usize| (0..n).map(|i| Waypoint::address(format!("stop {i}")));

    let err = client
        .compute_routes(Waypoint::address("A"), Waypoint::address("B"))
        .intermediates(stops(26))
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, MapsError::InvalidArgument(_)));
    assert_eq!(transport.sends(), 0);

    client
        .compute_routes(Waypoint::address("A"), Waypoint::address("B"))
        .intermediates(stops(25))
        .fetch()
        .await
        .unwrap();
    assert_eq!(transport.sends(), 1);
}

#[tokio::test]
async fn matrix_sizes_are_checked() {
    let (transport, client) = client();
    let points = |n: usize| (0..n).map(|_| Waypoint::lat_lng(10.0, 10.0)).collect::<Vec<_>>();

    for (origins, destinations) in [(0, 1), (1, 0), (51, 1), (1, 51)] {
        let err = client
            .route_matrix(points(origins), points(destinations))
            .fetch()
            .await
            .unwrap_err();
        assert!(
            matches!(err, MapsError::InvalidArgument(_)),
            "{origins}x{destinations}"
        );
    }
    assert_eq!(transport.sends(), 0);

    client
        .route_matrix(points(50), points(50))
        .fetch()
        .await
        .unwrap();
    assert_eq!(transport.sends(), 1);
}

#[tokio::test]
async fn blank_place_ids_and_addresses_are_rejected() {
    let (_, client) = client();
    let err = client
        .compute_routes(Waypoint::place_id("  "), Waypoint::address("B"))
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, MapsError::InvalidArgument(_)));
}
