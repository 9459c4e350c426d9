//! Time-bounded GET response cache.
//!
//! One instance per application, injected into [`crate::ApiClient`]. Expired
//! entries are evicted on read and swept on write; mutations invalidate by
//! URL prefix.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

#[derive(Debug)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
}

impl ResponseCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: DashMap::new() }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }

    /// Fresh value for `key`, evicting it if it has expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if self.is_fresh(&entry) {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| !self.is_fresh(entry));
        None
    }

    /// Store `value` under `key`, sweeping every expired entry first.
    pub fn set(&self, key: String, value: Value) {
        self.entries.retain(|_, entry| self.is_fresh(entry));
        self.entries.insert(key, CacheEntry { value, stored_at: Instant::now() });
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drop every entry whose key starts with `prefix`. Returns how many were dropped.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before.saturating_sub(self.entries.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(timberdesk_core::DEFAULT_CACHE_TTL_SECS))
    }
}

/// Cache key for a GET: URL plus query params in sorted order.
#[must_use]
pub fn cache_key(url: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return url.to_owned();
    }
    let mut sorted: Vec<_> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    sorted.sort();
    format!("{url}?{}", sorted.join("&"))
}
