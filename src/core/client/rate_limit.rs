use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::core::MapsError;

/// Sliding-window call admission, tracked per identity.
///
/// Each identity keeps the instants of its admitted calls inside the trailing `period`.
/// A call is admitted while fewer than `max_calls` of them remain in the window.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    calls: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, period: Duration) -> Result<Self, MapsError> {
        if max_calls == 0 {
            return Err(MapsError::Config("rate limit max_calls must be at least 1".into()));
        }
        if period.is_zero() {
            return Err(MapsError::Config("rate limit period must be positive".into()));
        }
        Ok(Self {
            max_calls,
            period,
            calls: Mutex::new(HashMap::new()),
        })
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Admit one call for `identity`, or fail with [`MapsError::RateLimited`].
    ///
    /// Pruning, the capacity check and recording the call happen under one lock.
    pub fn acquire(&self, identity: &str) -> Result<(), MapsError> {
        let now = Instant::now();
        let mut calls = self.calls.lock();
        let window = calls.entry(identity.to_string()).or_default();
        prune(window, now, self.period);

        if window.len() >= self.max_calls {
            let retry_after = wait_for(window, now, self.period);
            return Err(MapsError::RateLimited {
                max_calls: self.max_calls,
                period: self.period,
                retry_after,
            });
        }

        window.push_back(now);
        Ok(())
    }

    /// Calls still available to `identity` in the current window.
    ///
    /// An identity whose window has emptied is forgotten.
    pub fn get_remaining(&self, identity: &str) -> usize {
        let now = Instant::now();
        let mut calls = self.calls.lock();
        let Some(window) = calls.get_mut(identity) else {
            return self.max_calls;
        };
        prune(window, now, self.period);
        let used = window.len();
        if used == 0 {
            calls.remove(identity);
        }
        self.max_calls.saturating_sub(used)
    }

    /// Time until `identity` may call again; zero while under the limit.
    ///
    /// An identity whose window has emptied is forgotten.
    pub fn get_wait_time(&self, identity: &str) -> Duration {
        let now = Instant::now();
        let mut calls = self.calls.lock();
        let Some(window) = calls.get_mut(identity) else {
            return Duration::ZERO;
        };
        prune(window, now, self.period);
        if window.is_empty() {
            calls.remove(identity);
            return Duration::ZERO;
        }
        if window.len() < self.max_calls {
            Duration::ZERO
        } else {
            wait_for(window, now, self.period)
        }
    }

    /// Number of identities with calls inside their current window.
    pub fn tracked_identities(&self) -> usize {
        let now = Instant::now();
        let mut calls = self.calls.lock();
        calls.retain(|_, window| {
            prune(window, now, self.period);
            !window.is_empty()
        });
        calls.len()
    }

    /// Forget the call history of one identity.
    pub fn reset(&self, identity: &str) {
        self.calls.lock().remove(identity);
    }
}

fn prune(window: &mut VecDeque<Instant>, now: Instant, period: Duration) {
    while window
        .front()
        .is_some_and(|&t| now.saturating_duration_since(t) >= period)
    {
        window.pop_front();
    }
}

fn wait_for(window: &VecDeque<Instant>, now: Instant, period: Duration) -> Duration {
    window
        .front()
        .map(|&oldest| period.saturating_sub(now.saturating_duration_since(oldest)))
        .unwrap_or(Duration::ZERO)
}
