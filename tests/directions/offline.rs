use std::time::Duration;

use httpmock::Method::GET;

use google_maps_rs::directions::{Avoid, DepartureTime, DirectionsMode, OutputFormat, TransitMode};
use google_maps_rs::{CacheMode, ErrorKind, MapsError};

use crate::common::{fast_retry, mock_client, setup_server};

const OK_BODY: &str = r#"{"status":"OK","routes":[{"summary":"I-280 S","legs":[{"distance":{"value":42000}}]}]}"#;

#[tokio::test]
async fn directions_sends_query_params() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/maps/api/directions/json")
            .query_param("key", "test-key")
            .query_param("origin", "Sydney Town Hall")
            .query_param("destination", "Parramatta, NSW")
            .query_param("mode", "transit")
            .query_param("waypoints", "Ashfield|Strathfield")
            .query_param("alternatives", "true")
            .query_param("avoid", "tolls|ferries")
            .query_param("transit_mode", "bus|rail")
            .query_param("departure_time", "now")
            .query_param("language", "en-AU");
        then.status(200)
            .header("content-type", "application/json")
            .body(OK_BODY);
    });

    let client = mock_client(&server).build().unwrap();
    let body = client
        .directions("Sydney Town Hall", "Parramatta, NSW")
        .mode(DirectionsMode::Transit)
        .waypoints(["Ashfield", "Strathfield"])
        .alternatives(true)
        .avoid([Avoid::Tolls, Avoid::Ferries])
        .transit_mode([TransitMode::Bus, TransitMode::Rail])
        .departure_time(DepartureTime::Now)
        .language("en-AU")
        .fetch()
        .await
        .unwrap();

    mock.assert();
    assert_eq!(body["routes"][0]["summary"], "I-280 S");
}

#[tokio::test]
async fn xml_format_is_normalized() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/maps/api/directions/xml")
            .query_param("origin", "A")
            .query_param("mode", "driving");
        then.status(200)
            .header("content-type", "application/xml; charset=UTF-8")
            .body(
                "<DirectionsResponse><status>OK</status>\
                 <route><summary>A1</summary></route></DirectionsResponse>",
            );
    });

    let client = mock_client(&server).build().unwrap();
    let body = client
        .directions("A", "B")
        .format(OutputFormat::Xml)
        .fetch()
        .await
        .unwrap();

    mock.assert();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["route"]["summary"], "A1");
}

#[tokio::test]
async fn zero_results_is_not_found() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/maps/api/directions/json");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"status":"ZERO_RESULTS","routes":[]}"#);
    });

    let client = mock_client(&server).build().unwrap();
    let err = client.directions("A", "B").fetch().await.unwrap_err();

    mock.assert();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.as_api().unwrap().message, "No results found");
    assert!(err.to_string().contains("No results found"));
}

#[tokio::test]
async fn request_denied_is_permission_denied() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/maps/api/directions/json");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"status":"REQUEST_DENIED","error_message":"The provided API key is invalid."}"#);
    });

    let client = mock_client(&server)
        .retry(fast_retry(3))
        .build()
        .unwrap();
    let err = client.directions("A", "B").fetch().await.unwrap_err();

    // Terminal status, so the retry budget is not spent
    mock.assert_calls(1);
    match err {
        MapsError::Api(api) => {
            assert_eq!(api.kind, ErrorKind::PermissionDenied);
            assert_eq!(api.message, "The provided API key is invalid.");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/maps/api/directions/json");
        then.status(503).body("Service Unavailable");
    });

    let client = mock_client(&server)
        .retry(fast_retry(2))
        .build()
        .unwrap();
    let err = client.directions("A", "B").fetch().await.unwrap_err();

    mock.assert_calls(3);
    assert_eq!(err.kind(), ErrorKind::InternalServer);
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn cached_directions_skip_the_network() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/maps/api/directions/json");
        then.status(200)
            .header("content-type", "application/json")
            .body(OK_BODY);
    });

    let client = mock_client(&server)
        .cache_ttl(Duration::from_secs(300))
        .build()
        .unwrap();

    let first = client.directions("A", "B").fetch().await.unwrap();
    let second = client.directions("A", "B").fetch().await.unwrap();
    assert_eq!(first, second);
    mock.assert_calls(1);

    client
        .directions("A", "B")
        .cache_mode(CacheMode::Refresh)
        .fetch()
        .await
        .unwrap();
    mock.assert_calls(2);

    client
        .directions("A", "C")
        .fetch()
        .await
        .unwrap();
    mock.assert_calls(3);
}

#[tokio::test]
async fn per_call_retry_override() {
    let server = setup_server();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/maps/api/directions/json");
        then.status(500).body("boom");
    });

    let client = mock_client(&server).build().unwrap();
    client
        .directions("A", "B")
        .retry_policy(Some(fast_retry(1)))
        .fetch()
        .await
        .unwrap_err();

    mock.assert_calls(2);
}
