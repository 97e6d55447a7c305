use std::collections::HashSet;
use std::time::Duration;

use google_maps_rs::core::client::retry::{backoff_delay, should_retry};
use google_maps_rs::{
    Backoff, ErrorKind, MapsError, NetworkFailure, REQUEST_ID_HEADER, Request, RetryConfig,
};

use crate::common::{ScriptedTransport, Step, directions_url, fast_retry, scripted_client};

#[test]
fn backoff_grows_and_saturates_without_jitter() {
    let base = Duration::from_millis(100);
    let max = Duration::from_secs(2);
    let d0 = backoff_delay(0, base, max, 2.0, false);
    let d1 = backoff_delay(1, base, max, 2.0, false);
    let d2 = backoff_delay(2, base, max, 2.0, false);

    assert_eq!(d0, base);
    assert!(d0 < d1 && d1 < d2);
    assert!(d2 <= max);
    assert_eq!(backoff_delay(30, base, max, 2.0, false), max);
    assert_eq!(backoff_delay(u32::MAX, base, max, 2.0, false), max);
}

#[test]
fn jitter_only_adds_up_to_a_quarter() {
    let base = Duration::from_millis(100);
    let max = Duration::from_secs(10);
    for attempt in 0..5 {
        let plain = backoff_delay(attempt, base, max, 2.0, false);
        let jittered = backoff_delay(attempt, base, max, 2.0, true);
        assert!(jittered >= plain);
        assert!(jittered <= plain.mul_f64(1.25));
    }
}

#[test]
fn classification_of_retryable_failures() {
    let timeout = NetworkFailure::Timeout("t".into());
    let refused = NetworkFailure::Connect("c".into());
    assert!(should_retry(Some(&timeout), None));
    assert!(should_retry(Some(&refused), None));
    assert!(!should_retry(Some(&NetworkFailure::Closed), None));

    for status in [500, 502, 503] {
        assert!(should_retry(None, Some(status)), "{status} should retry");
    }
    for status in [400, 403, 404, 429] {
        assert!(!should_retry(None, Some(status)), "{status} should not retry");
    }
    assert!(!should_retry(None, None));
}

#[test]
fn policy_flags_gate_network_retries() {
    let cfg = RetryConfig {
        retry_on_timeout: false,
        ..RetryConfig::default()
    };
    assert!(!cfg.should_retry(Some(&NetworkFailure::Timeout("t".into())), None));
    assert!(cfg.should_retry(Some(&NetworkFailure::Connect("c".into())), None));
    assert_eq!(RetryConfig::disabled().retry_budget(), 0);
    assert_eq!(RetryConfig::with_max_retries(5).retry_budget(), 5);
}

#[test]
fn invalid_backoff_is_rejected_at_build() {
    let cfg = RetryConfig {
        backoff: Backoff::Exponential {
            base: Duration::from_secs(2),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: false,
        },
        ..RetryConfig::default()
    };
    let err = google_maps_rs::MapsClient::builder()
        .api_key("k")
        .retry(cfg)
        .build()
        .unwrap_err();
    assert!(matches!(err, MapsError::Config(_)));
}

#[tokio::test]
async fn persistent_5xx_exhausts_budget_and_reports_last_failure() {
    let transport = ScriptedTransport::new([
        Step::json(500, r#"{"error":{"message":"first"}}"#),
        Step::json(502, r#"{"error":{"message":"second"}}"#),
        Step::json(503, r#"{"error":{"message":"last"}}"#),
    ]);
    let client = scripted_client(&transport)
        .retry(fast_retry(2))
        .build()
        .unwrap();

    let err = client
        .execute(Request::get(directions_url()))
        .await
        .unwrap_err();

    assert_eq!(transport.sends(), 3);
    let api = err.as_api().expect("api error");
    assert_eq!(api.kind, ErrorKind::InternalServer);
    assert_eq!(api.status, Some(503));
    assert_eq!(api.message, "last");
    assert_eq!(api.attempts, 3);
    assert!(err.to_string().contains("after 3 attempts"));
}

#[tokio::test]
async fn terminal_statuses_are_not_retried() {
    for status in [400u16, 403, 404, 429] {
        let transport = ScriptedTransport::new([Step::json(status, "{}")]);
        let client = scripted_client(&transport)
            .retry(fast_retry(3))
            .build()
            .unwrap();

        let err = client
            .execute(Request::get(directions_url()))
            .await
            .unwrap_err();
        assert_eq!(transport.sends(), 1, "status {status}");
        assert_eq!(err.status(), Some(status));
    }
}

#[tokio::test]
async fn each_attempt_gets_a_fresh_correlation_id() {
    let transport = ScriptedTransport::new([Step::Connect, Step::Timeout, Step::Connect]);
    let client = scripted_client(&transport)
        .retry(fast_retry(2))
        .build()
        .unwrap();

    let err = client
        .execute(Request::get(directions_url()))
        .await
        .unwrap_err();

    let ids: Vec<String> = transport
        .requests()
        .iter()
        .map(|r| r.header(REQUEST_ID_HEADER).unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 3);

    // the error carries the id of the final attempt and the network cause
    assert_eq!(err.correlation_id(), ids.last().map(String::as_str));
    let api = err.as_api().unwrap();
    assert!(matches!(api.network_failure(), Some(NetworkFailure::Connect(_))));
    assert!(std::error::Error::source(api).is_some());
}

#[tokio::test]
async fn per_call_override_replaces_client_policy() {
    let transport = ScriptedTransport::new([Step::Timeout, Step::ok()]);
    let client = scripted_client(&transport)
        .retry(fast_retry(3))
        .build()
        .unwrap();

    let err = client
        .execute_with(
            Request::get(directions_url()),
            Default::default(),
            Some(&RetryConfig::disabled()),
        )
        .await
        .unwrap_err();

    assert_eq!(transport.sends(), 1);
    assert!(err.is_retryable());
}

#[test]
fn backoff_is_total_for_degenerate_inputs() {
    let base = Duration::from_millis(1);
    let max = Duration::from_millis(10);
    for attempt in 0..4 {
        let d = backoff_delay(attempt, base, max, -2.0, false);
        assert!(d <= max, "attempt {attempt}: {d:?}");
    }
    assert_eq!(backoff_delay(1, base, max, -2.0, false), Duration::ZERO);
    let nan = backoff_delay(3, base, max, f64::NAN, true);
    assert!(nan >= max && nan <= max.mul_f64(1.25));

    let huge = Duration::MAX;
    assert_eq!(backoff_delay(u32::MAX, base, huge, 2.0, false), huge);
    assert_eq!(backoff_delay(u32::MAX, base, huge, 2.0, true), huge);
}

#[tokio::test]
async fn invalid_per_call_override_is_rejected_before_sending() {
    let transport = ScriptedTransport::new([Step::Timeout, Step::Timeout, Step::ok()]);
    let client = scripted_client(&transport)
        .rate_limit(5, Duration::from_secs(60))
        .build()
        .unwrap();
    let negative = RetryConfig {
        max_retries: 2,
        backoff: Backoff::Exponential {
            base: Duration::from_millis(1),
            factor: -2.0,
            max: Duration::from_millis(10),
            jitter: false,
        },
        ..RetryConfig::default()
    };

    let err = client
        .execute_with(
            Request::get(directions_url()),
            Default::default(),
            Some(&negative),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MapsError::Config(_)), "{err:?}");
    assert_eq!(transport.sends(), 0);
    assert_eq!(client.rate_limiter().unwrap().get_remaining("test-client"), 5);
}

#[tokio::test]
async fn invalid_builder_override_is_rejected() {
    let transport = ScriptedTransport::empty();
    let client = scripted_client(&transport).build().unwrap();
    let zero_base = RetryConfig {
        backoff: Backoff::Exponential {
            base: Duration::ZERO,
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: false,
        },
        ..RetryConfig::default()
    };

    let err = client
        .directions("A", "B")
        .retry_policy(Some(zero_base))
        .fetch()
        .await
        .unwrap_err();

    assert!(matches!(err, MapsError::Config(_)));
    assert_eq!(transport.sends(), 0);
}

#[tokio::test]
async fn no_retries_without_a_policy() {
    let transport = ScriptedTransport::new([Step::json(503, "{}")]);
    let client = scripted_client(&transport).build().unwrap();

    assert!(client.retry_config().is_none());
    assert!(client.execute(Request::get(directions_url())).await.is_err());
    assert_eq!(transport.sends(), 1);
}
