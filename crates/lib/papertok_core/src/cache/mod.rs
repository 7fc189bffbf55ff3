//! In-memory key/value cache with TTL-based expiration.
//!
//! [`Cache`] is the contract feature repositories depend on. [`TtlCache`]
//! keeps entries in a single `RwLock`-guarded map and reclaims expired
//! entries with a periodic sweep; [`NoopCache`] stands in when caching is
//! disabled.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

/// Default cadence of the background expiry sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Expiring key/value store.
///
/// A `set` with a zero or negative TTL stores an entry that is already
/// expired; `get` never returns it. A TTL past the representable range
/// never expires.
pub trait Cache<V>: Send + Sync {
    /// Returns the value if present and not yet expired.
    fn get(&self, key: &str) -> Option<V>;

    /// Insert or fully replace the entry for `key`.
    fn set(&self, key: &str, value: V, ttl: chrono::Duration);

    fn delete(&self, key: &str);

    fn clear(&self);
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Map-backed cache with per-entry expiry.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    // A panic while holding the lock cannot leave a half-written entry, so a
    // poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

impl<V> TtlCache<V>
where
    V: Send + Sync + 'static,
{
    /// Spawn a periodic sweep task on the current tokio runtime.
    ///
    /// The task holds an `Arc` to the cache and runs until aborted.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = cache.purge_expired();
                if removed > 0 {
                    debug!(removed, remaining = cache.len(), "cache sweep");
                }
            }
        })
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Cache<V> for TtlCache<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> {
        let now = Utc::now();
        self.read().get(key).and_then(|entry| {
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.value.clone())
            }
        })
    }

    fn set(&self, key: &str, value: V, ttl: chrono::Duration) {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.write()
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    fn delete(&self, key: &str) {
        self.write().remove(key);
    }

    fn clear(&self) {
        self.write().clear();
    }
}

/// Cache that stores nothing; every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl<V> Cache<V> for NoopCache {
    fn get(&self, _key: &str) -> Option<V> {
        None
    }

    fn set(&self, _key: &str, _value: V, _ttl: chrono::Duration) {}

    fn delete(&self, _key: &str) {}

    fn clear(&self) {}
}
