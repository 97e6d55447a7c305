use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::core::MapsError;

/// State of a [`CircuitBreaker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls flow normally.
    Closed,
    /// Calls are refused until the open duration elapses.
    Open,
    /// One probe call is allowed through to test recovery.
    HalfOpen,
}

type FailurePredicate = Arc<dyn Fn(&MapsError) -> bool + Send + Sync>;

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
    probe_in_flight: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Admission {
    Normal,
    Probe,
}

/// Three-state failure-isolation gate, usually one per downstream API.
///
/// All state reads and transitions happen under a single mutex. The OPEN → HALF_OPEN
/// transition and the admission of the probe call are decided in the same critical
/// section, so only one caller ever acts as the probe.
pub struct CircuitBreaker {
    failure_threshold: u32,
    open_duration: Duration,
    is_failure: FailurePredicate,
    inner: Mutex<BreakerState>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("failure_threshold", &self.failure_threshold)
            .field("open_duration", &self.open_duration)
            .field("inner", &*self.inner.lock())
            .finish()
    }
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, open_duration: Duration) -> Result<Self, MapsError> {
        if failure_threshold == 0 {
            return Err(MapsError::Config(
                "circuit breaker failure_threshold must be positive".into(),
            ));
        }
        if open_duration.is_zero() {
            return Err(MapsError::Config(
                "circuit breaker open duration must be positive".into(),
            ));
        }
        Ok(Self {
            failure_threshold,
            open_duration,
            is_failure: Arc::new(|_| true),
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
                probe_in_flight: false,
            }),
        })
    }

    /// Restrict which errors count as failures. By default every error does.
    ///
    /// Errors rejected by the predicate pass through without touching the failure count.
    pub fn with_failure_predicate(
        mut self,
        pred: impl Fn(&MapsError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_failure = Arc::new(pred);
        self
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    pub fn open_duration(&self) -> Duration {
        self.open_duration
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    pub fn failure_count(&self) -> u32 {
        self.inner.lock().failure_count
    }

    /// Force the breaker back to CLOSED, discarding its failure history.
    pub fn reset(&self) {
        let mut s = self.inner.lock();
        s.state = CircuitState::Closed;
        s.failure_count = 0;
        s.last_failure = None;
        s.probe_in_flight = false;
    }

    /// Run `work` through the breaker.
    ///
    /// Fails with [`MapsError::CircuitOpen`] without calling `work` while the breaker is
    /// open; otherwise returns whatever `work` returns and records the outcome.
    pub async fn call<F, Fut, T>(&self, work: F) -> Result<T, MapsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, MapsError>>,
    {
        let admission = self.admit()?;
        let mut guard = ProbeGuard {
            breaker: self,
            armed: admission == Admission::Probe,
        };

        let result = work().await;
        guard.armed = false;

        match &result {
            Ok(_) => self.on_success(admission),
            Err(e) if (self.is_failure)(e) => self.on_failure(admission),
            Err(_) => self.release(admission),
        }
        result
    }

    fn admit(&self) -> Result<Admission, MapsError> {
        let mut s = self.inner.lock();
        match s.state {
            CircuitState::Closed => Ok(Admission::Normal),
            CircuitState::Open => {
                let elapsed = s
                    .last_failure
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::ZERO);
                if elapsed < self.open_duration {
                    return Err(MapsError::CircuitOpen {
                        remaining: self.open_duration - elapsed,
                    });
                }
                s.state = CircuitState::HalfOpen;
                s.failure_count = 0;
                s.probe_in_flight = true;
                Ok(Admission::Probe)
            }
            // the probe may fail and reopen the breaker for a full cool-down
            CircuitState::HalfOpen if s.probe_in_flight => Err(MapsError::CircuitOpen {
                remaining: self.open_duration,
            }),
            CircuitState::HalfOpen => {
                s.probe_in_flight = true;
                Ok(Admission::Probe)
            }
        }
    }

    fn on_success(&self, admission: Admission) {
        let mut s = self.inner.lock();
        match (s.state, admission) {
            (CircuitState::HalfOpen, Admission::Probe) => {
                s.state = CircuitState::Closed;
                s.failure_count = 0;
                s.last_failure = None;
                s.probe_in_flight = false;
                info!("circuit breaker closed after successful probe");
            }
            (CircuitState::Closed, _) => s.failure_count = 0,
            _ => {}
        }
    }

    fn on_failure(&self, admission: Admission) {
        let mut s = self.inner.lock();
        match (s.state, admission) {
            (CircuitState::HalfOpen, Admission::Probe) => {
                s.state = CircuitState::Open;
                s.failure_count += 1;
                s.last_failure = Some(Instant::now());
                s.probe_in_flight = false;
                warn!("circuit breaker probe failed; reopening");
            }
            (CircuitState::Closed, _) => {
                s.failure_count += 1;
                s.last_failure = Some(Instant::now());
                if s.failure_count >= self.failure_threshold {
                    s.state = CircuitState::Open;
                    warn!(
                        failures = s.failure_count,
                        open_for = ?self.open_duration,
                        "circuit breaker opened"
                    );
                }
            }
            _ => {}
        }
    }

    fn release(&self, admission: Admission) {
        if admission == Admission::Probe {
            self.inner.lock().probe_in_flight = false;
        }
    }
}

/// Reopens the breaker if a probe call is dropped before it completes.
struct ProbeGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.on_failure(Admission::Probe);
        }
    }
}
