use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use google_maps_rs::{ApiError, CircuitBreaker, CircuitState, ErrorKind, MapsError, Request};

use crate::common::{ScriptedTransport, Step, directions_url, fast_retry, scripted_client};

fn failure() -> MapsError {
    ApiError::new(ErrorKind::InternalServer, "boom")
        .with_status(500)
        .into()
}

async fn fail(breaker: &CircuitBreaker) {
    let r: Result<(), _> = breaker.call(|| async { Err(failure()) }).await;
    assert!(r.is_err());
}

#[tokio::test]
async fn opens_after_threshold_and_skips_work() {
    let breaker = CircuitBreaker::new(3, Duration::from_secs(60)).unwrap();
    for _ in 0..2 {
        fail(&breaker).await;
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
    fail(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::Open);

    let invoked = AtomicUsize::new(0);
    let err = breaker
        .call(|| async {
            invoked.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap_err();

    assert_eq!(invoked.load(Ordering::SeqCst), 0);
    match err {
        MapsError::CircuitOpen { remaining } => {
            assert!(remaining > Duration::ZERO && remaining <= Duration::from_secs(60));
        }
        other => panic!("expected CircuitOpen, got {other:?}"),
    }
}

#[tokio::test]
async fn success_resets_failure_count() {
    let breaker = CircuitBreaker::new(2, Duration::from_secs(60)).unwrap();
    fail(&breaker).await;
    assert_eq!(breaker.failure_count(), 1);

    breaker.call(|| async { Ok(()) }).await.unwrap();
    assert_eq!(breaker.failure_count(), 0);

    fail(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test]
async fn successful_probe_closes() {
    let breaker = CircuitBreaker::new(1, Duration::from_millis(50)).unwrap();
    fail(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::Open);

    tokio::time::sleep(Duration::from_millis(80)).await;

    let v = breaker.call(|| async { Ok(7) }).await.unwrap();
    assert_eq!(v, 7);
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.failure_count(), 0);
}

#[tokio::test]
async fn failed_probe_reopens() {
    let breaker = CircuitBreaker::new(1, Duration::from_millis(50)).unwrap();
    fail(&breaker).await;

    tokio::time::sleep(Duration::from_millis(80)).await;
    fail(&breaker).await;

    assert_eq!(breaker.state(), CircuitState::Open);
    let r: Result<(), _> = breaker.call(|| async { Ok(()) }).await;
    assert!(matches!(r, Err(MapsError::CircuitOpen { .. })));
}

#[tokio::test]
async fn half_open_admits_a_single_probe() {
    let breaker = Arc::new(CircuitBreaker::new(1, Duration::from_millis(30)).unwrap());
    fail(&breaker).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let probe = {
        let breaker = breaker.clone();
        tokio::spawn(async move {
            breaker
                .call(|| async {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok(())
                })
                .await
        })
    };

    // wait until the probe has been admitted
    while breaker.state() != CircuitState::HalfOpen {
        tokio::task::yield_now().await;
    }

    let invoked = AtomicUsize::new(0);
    let second = breaker
        .call(|| async {
            invoked.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;
    // refused callers are told to wait a full cool-down, not to spin
    assert!(matches!(
        second,
        Err(MapsError::CircuitOpen { remaining }) if remaining == Duration::from_millis(30)
    ));
    assert_eq!(invoked.load(Ordering::SeqCst), 0);

    probe.await.unwrap().unwrap();
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test]
async fn predicate_filters_counted_failures() {
    let breaker = CircuitBreaker::new(1, Duration::from_secs(60))
        .unwrap()
        .with_failure_predicate(|e| e.kind() == ErrorKind::InternalServer);

    let r: Result<(), _> = breaker
        .call(|| async { Err(ApiError::new(ErrorKind::NotFound, "missing").into()) })
        .await;
    assert!(r.is_err());
    assert_eq!(breaker.state(), CircuitState::Closed);

    fail(&breaker).await;
    assert_eq!(breaker.state(), CircuitState::Open);

    breaker.reset();
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[test]
fn invalid_settings_are_rejected() {
    assert!(CircuitBreaker::new(0, Duration::from_secs(1)).is_err());
    assert!(CircuitBreaker::new(1, Duration::ZERO).is_err());
}

#[tokio::test]
async fn breaker_records_one_outcome_per_logical_call() {
    let transport = ScriptedTransport::new([
        Step::json(503, "unavailable"),
        Step::json(503, "unavailable"),
        Step::json(503, "unavailable"),
    ]);
    let breaker = Arc::new(CircuitBreaker::new(2, Duration::from_secs(60)).unwrap());
    let client = scripted_client(&transport)
        .retry(fast_retry(2))
        .circuit_breaker(breaker.clone())
        .build()
        .unwrap();

    let err = client
        .execute(Request::get(directions_url()))
        .await
        .unwrap_err();
    assert_eq!(err.as_api().unwrap().attempts, 3);
    assert_eq!(breaker.failure_count(), 1);
    assert_eq!(breaker.state(), CircuitState::Closed);
}
