use std::time::Duration;

use google_maps_rs::{MapsClient, NetworkFailure, Request};

use crate::common::{ScriptedTransport, directions_url, scripted_client};

#[tokio::test]
async fn close_is_idempotent() {
    let transport = ScriptedTransport::empty();
    let client = scripted_client(&transport).build().unwrap();

    assert!(!client.is_closed());
    client.close();
    client.close();
    assert!(client.is_closed());
    assert_eq!(transport.close_calls(), 2);

    let err = client
        .execute(Request::get(directions_url()))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_api().and_then(|e| e.network_failure()),
        Some(NetworkFailure::Closed)
    ));
}

#[test]
fn concurrent_close_of_the_default_transport() {
    let client = MapsClient::builder()
        .api_key("k")
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            std::thread::spawn(move || client.close())
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert!(client.is_closed());
}

#[test]
fn debug_output_redacts_the_key() {
    let client = MapsClient::new("super-secret-key").unwrap();
    let dbg = format!("{client:?}");
    assert!(!dbg.contains("super-secret-key"));
    assert!(dbg.contains("***"));
}

#[test]
fn empty_api_key_is_rejected() {
    assert!(MapsClient::new("   ").is_err());
}
