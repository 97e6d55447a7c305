use google_maps_rs::MapsError;

use crate::common::{ScriptedTransport, scripted_client};

#[tokio::test]
async fn point_lists_must_be_non_empty_and_bounded() {
    let transport = ScriptedTransport::empty();
    let client = scripted_client(&transport).build().unwrap();

    let err = client
        .snap_to_roads(Vec::<(f64, f64)>::new())
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, MapsError::InvalidArgument(_)));

    let too_many: Vec<(f64, f64)> = (0..101).map(|i| (f64::from(i) / 1000.0, 0.0)).collect();
    let err = client
        .nearest_roads(too_many)
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, MapsError::InvalidArgument(_)));

    let err = client
        .snap_to_roads([(10.0, 10.0), (95.0, 10.0)])
        .fetch()
        .await
        .unwrap_err();
    let MapsError::InvalidArgument(msg) = err else {
        panic!("expected InvalidArgument, got {err:?}");
    };
    assert!(msg.contains("index 1"), "{msg}");

    assert_eq!(transport.sends(), 0);

    let max: Vec<(f64, f64)> = (0..100).map(|i| (f64::from(i) / 1000.0, 0.0)).collect();
    client.nearest_roads(max).fetch().await.unwrap();
    assert_eq!(transport.sends(), 1);
}

#[tokio::test]
async fn speed_limits_need_exactly_one_source() {
    let transport = ScriptedTransport::empty();
    let client = scripted_client(&transport).build().unwrap();

    let neither = client.speed_limits().fetch().await.unwrap_err();
    assert!(matches!(neither, MapsError::InvalidArgument(_)));

    let both = client
        .speed_limits()
        .path([(1.0, 2.0)])
        .place_ids(["ChIJ1"])
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(both, MapsError::InvalidArgument(_)));

    let blank = client
        .speed_limits()
        .place_ids(["ChIJ1", " "])
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(blank, MapsError::InvalidArgument(_)));

    let too_many = client
        .speed_limits()
        .place_ids((0..101).map(|i| format!("place-{i}")))
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(too_many, MapsError::InvalidArgument(_)));

    assert_eq!(transport.sends(), 0);
}
