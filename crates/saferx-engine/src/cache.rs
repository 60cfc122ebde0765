//! Bounded, time-expiring memoization
//!
//! One generic cache backs pattern compilation, replacement validation and
//! glob translation. Entries are pure functions of their key, so losing one
//! to eviction only costs a recomputation.

use crate::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Size and expiry policy for a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Maximum number of distinct keys
    pub capacity: NonZeroUsize,
    /// Entries expire this long after their last access
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Counters describing how a cache has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

struct Slot<V> {
    value: V,
    last_access: Instant,
}

/// LRU map whose entries also expire after a period without access.
///
/// # Thread Safety
///
/// The map sits behind a `parking_lot::Mutex` that is only held for the
/// lookup or the insert, never while a value is being computed. Two callers
/// missing on the same key at once both compute it and the second insert
/// wins; both values are equal, so nobody can tell.
pub struct TtlCache<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, Slot<V>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(settings.capacity)),
            ttl: settings.ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a live entry, refreshing its access time.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get_mut(key) {
            Some(slot) if now.duration_since(slot.last_access) < self.ttl => {
                slot.last_access = now;
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("cache hit");
                return Some(slot.value.clone());
            }
            Some(_) => {}
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        }

        entries.pop(key);
        tracing::trace!(ttl = ?self.ttl, "cache entry expired");
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store `value`, evicting the least recently used entry when full.
    pub fn insert(&self, key: K, value: V) {
        let slot = Slot {
            value,
            last_access: Instant::now(),
        };
        self.entries.lock().put(key, slot);
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs without the lock held.
    pub fn get_or_insert_with<Q, F>(&self, key: &Q, compute: F) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute();
        self.insert(key.to_owned(), value.clone());
        value
    }

    /// Number of entries currently held, including expired ones not yet
    /// dropped.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
