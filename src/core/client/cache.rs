use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::core::MapsError;

/// Defines the behavior of the in-memory cache for an API call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present; otherwise, fetch from the network
    /// and write the response to the cache. (Default)
    #[default]
    Use,
    /// Always fetch from the network, bypassing any cached entry, and write the new response to the cache.
    Refresh,
    /// Always fetch from the network and do not read from or write to the cache.
    Bypass,
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now <= self.expires_at
    }
}

/// Bounded, time-expiring map from request fingerprints to response bodies.
///
/// Expired entries are purged lazily when touched, and eagerly when an insert finds the
/// cache full. If the cache is still full after that sweep, the entry closest to expiry
/// is evicted.
#[derive(Debug)]
pub struct TtlCache<V = Value> {
    map: Mutex<HashMap<String, CacheEntry<V>>>,
    maxsize: usize,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Default capacity used by the client builder.
    pub const DEFAULT_MAXSIZE: usize = 100;

    pub fn new(maxsize: usize, ttl: Duration) -> Result<Self, MapsError> {
        if maxsize == 0 {
            return Err(MapsError::Config("cache maxsize must be positive".into()));
        }
        if ttl.is_zero() {
            return Err(MapsError::Config("cache ttl must be positive".into()));
        }
        Ok(Self {
            map: Mutex::new(HashMap::new()),
            maxsize,
            ttl,
        })
    }

    pub fn maxsize(&self) -> usize {
        self.maxsize
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value for `key`, or `None` if missing or expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut map = self.map.lock();
        match map.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut map = self.map.lock();
        match map.get(key) {
            Some(entry) if entry.is_live(now) => true,
            Some(_) => {
                map.remove(key);
                false
            }
            None => false,
        }
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        self.insert_with_ttl(key, value, self.ttl);
    }

    /// Insert with a TTL other than the cache default.
    pub fn insert_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let now = Instant::now();
        let mut map = self.map.lock();

        if map.len() >= self.maxsize && !map.contains_key(&key) {
            map.retain(|_, entry| entry.is_live(now));
            if map.len() >= self.maxsize {
                let soonest = map
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(victim) = soonest {
                    map.remove(&victim);
                }
            }
        }

        map.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    pub fn clear(&self) {
        self.map.lock().clear();
    }

    /// Number of live entries. Sweeps expired entries as a side effect.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let mut map = self.map.lock();
        map.retain(|_, entry| entry.is_live(now));
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Deterministic fingerprint of a request.
///
/// Hashes the canonical JSON of `{method, url, params, data}`; object keys serialize in
/// sorted order, so parameter and body field order does not affect the key.
///
/// Keys are 16 hex digits from the standard library's `DefaultHasher`. They are stable
/// within one process only: the algorithm may change between toolchains, so keys must
/// never be persisted or shared across processes.
pub fn cache_key(method: &str, url: &str, params: &Value, data: Option<&Value>) -> String {
    let canonical = json!({
        "method": method,
        "url": url,
        "params": params,
        "data": data.cloned().unwrap_or_else(|| json!({})),
    })
    .to_string();

    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
