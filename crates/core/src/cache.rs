//! Ephemeral TTL cache.
//!
//! Entries expire a fixed duration after they were last written. Expired
//! entries are never returned: a lookup past expiry evicts the entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

pub const DEFAULT_TTL: StdDuration = StdDuration::from_secs(5 * 60);

/// Time source for expiry checks.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    pub fn advance(&self, by: StdDuration) {
        let by = Duration::from_std(by).unwrap_or(Duration::MAX);
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = now.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Clone, Debug)]
struct CacheEntry<V> {
    value: V,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

#[derive(Debug)]
pub struct TtlCache<V, C = SystemClock> {
    ttl: Duration,
    clock: C,
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V: Clone> TtlCache<V, SystemClock> {
    pub fn new(ttl: StdDuration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<V: Clone> Default for TtlCache<V, SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V: Clone, C: Clock> TtlCache<V, C> {
    pub fn with_clock(ttl: StdDuration, clock: C) -> Self {
        Self {
            ttl: Duration::from_std(ttl).unwrap_or(Duration::MAX),
            clock,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> StdDuration {
        self.ttl.to_std().unwrap_or(StdDuration::MAX)
    }

    /// Live value for `key`. An expired entry is evicted and reported absent.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;
        if entry.is_live(now) {
            return Some(entry.value.clone());
        }

        let age_secs = (now - entry.created_at).num_seconds();
        self.entries.remove(key);
        debug!(event_name = "storefront.cache.expired", key, age_secs, "cache entry expired");
        None
    }

    /// Insert or overwrite, restarting the expiry window.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let created_at = self.clock.now();
        let expires_at = created_at.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(key.into(), CacheEntry { value, created_at, expires_at });
    }

    /// Drop one entry, or every entry when `key` is `None`.
    pub fn invalidate(&mut self, key: Option<&str>) {
        match key {
            Some(key) => {
                self.entries.remove(key);
            }
            None => self.entries.clear(),
        }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries.get(key).is_some_and(|entry| entry.is_live(now))
    }

    /// Return the live value or run `fetch`, caching only a successful result.
    pub fn get_or_insert_with<E, F>(&mut self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        debug!(event_name = "storefront.cache.miss", key, "cache miss; fetching");
        let value = fetch()?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Remove every expired entry; returns how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before - self.entries.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries.values().filter(|entry| entry.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
