//! In-memory caching of fetch outcomes.
//!
//! The adapter consults an [`ArticleCache`] before every request and stores
//! the outcome afterwards. Whether failed outcomes are stored too is a
//! [`CachePolicy`] decision made by the adapter, not by the cache.

use crate::error::FetchError;
use crate::models::{ArticleTable, QueryKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::trace;

/// Result of one upstream fetch, as stored in and served from the cache.
pub type Outcome = Result<Arc<ArticleTable>, FetchError>;

/// Default time-to-live for cached outcomes (one hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Storage for fetch outcomes keyed by request identity.
pub trait ArticleCache: Send + Sync {
    /// Return the stored outcome if present and not expired.
    fn get(&self, key: &QueryKey) -> Option<Outcome>;

    /// Store an outcome that expires after `ttl`.
    fn put(&self, key: QueryKey, value: Outcome, ttl: Duration);
}

/// Which outcomes the adapter writes back to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Store failures as well as successes. A cached failure is served
    /// until its TTL runs out, so a transient outage sticks for that long.
    pub cache_failures: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            cache_failures: true,
        }
    }
}

impl CachePolicy {
    pub fn successes_only() -> Self {
        Self {
            cache_failures: false,
        }
    }

    pub fn should_store(&self, outcome: &Outcome) -> bool {
        outcome.is_ok() || self.cache_failures
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Outcome,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) < self.ttl
    }
}

/// Thread-safe `HashMap` cache with per-entry expiry.
///
/// Expired entries are evicted on lookup, on every [`put`], or by an
/// explicit [`purge_expired`], so keys that are never asked for again do
/// not accumulate.
///
/// [`put`]: ArticleCache::put
///
/// [`purge_expired`]: MemoryCache::purge_expired
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }
}

impl ArticleCache for MemoryCache {
    fn get(&self, key: &QueryKey) -> Option<Outcome> {
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => Some(entry.value.clone()),
            Some(_) => {
                trace!(%key, "Evicting expired cache entry");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: QueryKey, value: Outcome, ttl: Duration) {
        let now = Instant::now();
        let entry = CacheEntry {
            value,
            inserted_at: now,
            ttl,
        };
        let mut entries = self.lock();
        entries.retain(|_, existing| existing.is_fresh(now));
        entries.insert(key, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn key(topic: &str) -> QueryKey {
        QueryKey::Everything {
            topic: topic.to_string(),
        }
    }

    #[test]
    fn test_get_returns_same_arc() {
        let cache = MemoryCache::new();
        let table = Arc::new(ArticleTable::default());
        cache.put(key("rust"), Ok(Arc::clone(&table)), DEFAULT_TTL);

        let hit = cache.get(&key("rust")).unwrap().unwrap();
        assert!(Arc::ptr_eq(&hit, &table));
        assert!(cache.get(&key("go")).is_none());
    }

    #[test]
    fn test_entry_expires() {
        let cache = MemoryCache::new();
        cache.put(
            key("rust"),
            Ok(Arc::new(ArticleTable::default())),
            Duration::from_millis(20),
        );
        assert!(cache.get(&key("rust")).is_some());
        sleep(Duration::from_millis(40));
        assert!(cache.get(&key("rust")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let cache = MemoryCache::new();
        cache.put(key("rust"), Ok(Arc::new(ArticleTable::default())), Duration::ZERO);
        assert!(cache.get(&key("rust")).is_none());
    }

    #[test]
    fn test_failures_are_stored_as_given() {
        let cache = MemoryCache::new();
        cache.put(key("x"), Err(FetchError::Parse("eof".into())), DEFAULT_TTL);
        assert_eq!(
            cache.get(&key("x")),
            Some(Err(FetchError::Parse("eof".into())))
        );
    }

    #[test]
    fn test_purge_expired() {
        let cache = MemoryCache::new();
        cache.put(key("a"), Ok(Arc::new(ArticleTable::default())), Duration::from_millis(10));
        cache.put(key("b"), Ok(Arc::new(ArticleTable::default())), DEFAULT_TTL);
        sleep(Duration::from_millis(30));
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_evicts_expired_entries_for_other_keys() {
        let cache = MemoryCache::new();
        cache.put(key("old"), Ok(Arc::new(ArticleTable::default())), Duration::from_millis(10));
        sleep(Duration::from_millis(30));
        cache.put(key("new"), Ok(Arc::new(ArticleTable::default())), DEFAULT_TTL);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("new")).is_some());
    }

    #[test]
    fn test_policy() {
        let failure: Outcome = Err(FetchError::Transport("down".into()));
        let success: Outcome = Ok(Arc::new(ArticleTable::default()));
        assert!(CachePolicy::default().should_store(&failure));
        assert!(!CachePolicy::successes_only().should_store(&failure));
        assert!(CachePolicy::successes_only().should_store(&success));
    }
}
