use google_maps_rs::MapsError;

use crate::common::{ScriptedTransport, scripted_client};

#[tokio::test]
async fn blank_endpoints_are_rejected() {
    let transport = ScriptedTransport::empty();
    let client = scripted_client(&transport).build().unwrap();

    for (origin, destination) in [("", "B"), ("A", "  "), ("\t", "\n")] {
        let err = client
            .directions(origin, destination)
            .fetch()
            .await
            .unwrap_err();
        assert!(
            matches!(err, MapsError::InvalidArgument(_)),
            "{origin:?} -> {destination:?}"
        );
    }
    assert_eq!(transport.sends(), 0);
}

#[tokio::test]
async fn waypoints_are_capped_and_non_empty() {
    let transport = ScriptedTransport::empty();
    let client = scripted_client(&transport).build().unwrap();

    let too_many: Vec<String> = (0..26).map(|i| format!("stop {i}")).collect();
    let err = client
        .directions("A", "B")
        .waypoints(too_many)
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, MapsError::InvalidArgument(_)));

    let err = client
        .directions("A", "B")
        .waypoints(["Ashfield", ""])
        .fetch()
        .await
        .unwrap_err();
    assert!(matches!(err, MapsError::InvalidArgument(_)));
    assert_eq!(transport.sends(), 0);

    let max: Vec<String> = (0..25).map(|i| format!("stop {i}")).collect();
    client.directions("A", "B").waypoints(max).fetch().await.unwrap();
    assert_eq!(transport.sends(), 1);
}

#[tokio::test]
async fn endpoints_are_trimmed_before_sending() {
    let transport = ScriptedTransport::empty();
    let client = scripted_client(&transport).build().unwrap();

    client.directions("  A ", "B").fetch().await.unwrap();

    let requests = transport.requests();
    let origin = requests[0]
        .query
        .iter()
        .find(|(k, _)| k == "origin")
        .map(|(_, v)| v.as_str());
    assert_eq!(origin, Some("A"));
}
