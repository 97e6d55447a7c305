use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use super::cache::{CacheMode, TtlCache};
use super::circuit::CircuitBreaker;
use super::constants::{CONTENT_ENCODING_HEADER, CONTENT_TYPE_HEADER, REQUEST_ID_HEADER};
use super::hooks::Hooks;
use super::rate_limit::RateLimiter;
use super::retry::RetryConfig;
use crate::core::classify::classify;
use crate::core::net::{Transport, TransportBody, TransportRequest};
use crate::core::request::Request;
use crate::core::{ApiError, MapsError};

/// Composes admission, caching, circuit breaking and retries around one logical call.
#[derive(Debug)]
pub(crate) struct Executor {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) identity: String,
    pub(crate) rate_limiter: Option<Arc<RateLimiter>>,
    pub(crate) cache: Option<Arc<TtlCache>>,
    pub(crate) breaker: Option<Arc<CircuitBreaker>>,
    pub(crate) retry: Option<RetryConfig>,
    /// Minimum serialized body size to gzip; `None` disables compression.
    pub(crate) compression_threshold: Option<usize>,
    pub(crate) default_timeout: Duration,
    pub(crate) hooks: Hooks,
}

struct Completed {
    value: Value,
    attempts: u32,
}

impl Executor {
    pub(crate) async fn execute(
        &self,
        request: Request,
        cache_mode: CacheMode,
        retry_override: Option<&RetryConfig>,
    ) -> Result<Value, MapsError> {
        if let Some(cfg) = retry_override {
            cfg.validate()?;
        }
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire(&self.identity)?;
        }

        let cache = self
            .cache
            .as_deref()
            .filter(|_| cache_mode != CacheMode::Bypass);
        let key = cache.map(|_| request.cache_key());

        if cache_mode == CacheMode::Use
            && let (Some(cache), Some(key)) = (cache, key.as_deref())
            && let Some(hit) = cache.get(key)
        {
            debug!(path = request.url.path(), "serving response from cache");
            return Ok(hit);
        }

        let retry = retry_override.or(self.retry.as_ref());
        let done = match &self.breaker {
            Some(breaker) => breaker.call(|| self.run_attempts(&request, retry)).await?,
            None => self.run_attempts(&request, retry).await?,
        };

        // Only first-attempt successes are memoized.
        if done.attempts == 1
            && let (Some(cache), Some(key)) = (cache, key)
        {
            debug!(path = request.url.path(), "caching response");
            cache.set(key, done.value.clone());
        }
        Ok(done.value)
    }

    async fn run_attempts(
        &self,
        request: &Request,
        retry: Option<&RetryConfig>,
    ) -> Result<Completed, MapsError> {
        let budget = retry.map(RetryConfig::retry_budget).unwrap_or(0);
        let (body, body_headers) = self.encode_body(request.body.as_ref());
        let query = request.query_pairs();
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut attempt: u32 = 0;
        loop {
            let request_id = Uuid::new_v4().to_string();

            let mut headers = request.headers.clone();
            headers.extend(body_headers.iter().cloned());
            headers.push((REQUEST_ID_HEADER.to_string(), request_id.clone()));

            let prepared = TransportRequest {
                method: request.method.clone(),
                url: request.url.clone(),
                headers,
                query: query.clone(),
                body: body.clone(),
                timeout,
            };

            debug!(
                method = %request.method,
                path = request.url.path(),
                request_id = %request_id,
                attempt = attempt + 1,
                "sending request"
            );
            self.hooks.before_request(&prepared);

            let error = match self.transport.send(prepared).await {
                Err(failure) => {
                    if let Some(policy) = retry
                        && attempt < budget
                        && policy.should_retry(Some(&failure), None)
                    {
                        self.back_off(policy, attempt, &failure).await;
                        attempt += 1;
                        continue;
                    }
                    ApiError::network(failure)
                }
                Ok(response) => {
                    self.hooks.after_response(&response);
                    match classify(&response) {
                        Ok(value) => {
                            return Ok(Completed {
                                value,
                                attempts: attempt + 1,
                            });
                        }
                        Err(err) => {
                            if let Some(policy) = retry
                                && attempt < budget
                                && policy.should_retry(None, err.status)
                            {
                                self.back_off(policy, attempt, &err).await;
                                attempt += 1;
                                continue;
                            }
                            err
                        }
                    }
                }
            };

            return Err(error
                .with_correlation_id(request_id)
                .with_attempts(attempt + 1)
                .into());
        }
    }

    async fn back_off(
        &self,
        policy: &RetryConfig,
        attempt: u32,
        cause: &(dyn std::error::Error + Send + Sync),
    ) {
        let delay = policy.backoff.delay_for(attempt);
        warn!(
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            error = %cause,
            "attempt failed; retrying"
        );
        sleep(delay).await;
    }

    /// Serialize the body once per logical call, gzipping it when it reaches the threshold.
    fn encode_body(&self, body: Option<&Value>) -> (Option<TransportBody>, Vec<(String, String)>) {
        let Some(body) = body else {
            return (None, Vec::new());
        };
        let Some(threshold) = self.compression_threshold else {
            return (Some(TransportBody::Json(body.clone())), Vec::new());
        };

        let raw = body.to_string().into_bytes();
        if raw.len() < threshold {
            return (Some(TransportBody::Json(body.clone())), Vec::new());
        }
        match gzip(&raw) {
            Some(compressed) => {
                debug!(
                    original = raw.len(),
                    compressed = compressed.len(),
                    "compressed request body"
                );
                (
                    Some(TransportBody::Bytes(compressed)),
                    vec![
                        (CONTENT_ENCODING_HEADER.to_string(), "gzip".to_string()),
                        (CONTENT_TYPE_HEADER.to_string(), "application/json".to_string()),
                    ],
                )
            }
            None => (Some(TransportBody::Json(body.clone())), Vec::new()),
        }
    }
}

fn gzip(raw: &[u8]) -> Option<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(raw.len() / 2), Compression::default());
    encoder.write_all(raw).ok()?;
    encoder.finish().ok()
}
