//! Concurrent Cache Module
//!
//! Thread-safe facade over a single [`LruStore`], created lazily on the first
//! write.

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::entry::accounted_size;
use crate::cache::{ByteView, CacheStats, LruStore, SizedValue};
use crate::error::{CacheError, Result};

// == Concurrent Cache ==
/// LRU cache that can be shared between threads behind an `Arc`.
///
/// Every operation takes one exclusive lock for its full duration, including
/// any evictions an insert triggers, so operations on one cache are
/// linearizable. A cache that is never written to never allocates its store.
#[derive(Debug)]
pub struct ConcurrentCache<V = ByteView> {
    inner: Mutex<Inner<V>>,
    /// Budget handed to the store when it is created, 0 = unbounded
    max_bytes: usize,
}

#[derive(Debug)]
struct Inner<V> {
    lru: Option<LruStore<V>>,
    /// Lookup counters; store-derived fields are filled in by `stats()`
    stats: CacheStats,
}

impl<V: SizedValue> ConcurrentCache<V> {
    // == Constructor ==
    /// Creates a cache with the given byte budget (0 = unbounded).
    ///
    /// No backing store is allocated until the first `add`.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                lru: None,
                stats: CacheStats::default(),
            }),
            max_bytes,
        }
    }

    // == Add ==
    /// Stores a value, evicting least recently used entries if over budget.
    ///
    /// An entry larger than the whole budget is still stored and evicts every
    /// other entry. Use [`try_add`](Self::try_add) to reject it instead.
    pub fn add(&self, key: impl Into<String>, value: V) {
        let mut inner = self.inner.lock();
        let max_bytes = self.max_bytes;
        inner
            .lru
            .get_or_insert_with(|| {
                debug!(max_bytes, "Creating LRU store on first write");
                LruStore::new(max_bytes)
            })
            .add(key, value);
    }

    // == Try Add ==
    /// Stores a value unless it alone would exceed the byte budget.
    ///
    /// # Errors
    /// Returns `CacheError::EntryTooLarge` and leaves the cache untouched when
    /// `len(key) + value.size()` is larger than a non-zero budget.
    pub fn try_add(&self, key: impl Into<String>, value: V) -> Result<()> {
        let key = key.into();
        let size = accounted_size(&key, &value);
        if self.max_bytes != 0 && size > self.max_bytes {
            return Err(CacheError::EntryTooLarge {
                key,
                size,
                max_bytes: self.max_bytes,
            });
        }

        self.add(key, value);
        Ok(())
    }

    /// Returns the configured byte budget.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    // == Length ==
    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.inner.lock().lru.as_ref().map_or(0, LruStore::len)
    }

    /// Returns true if no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reports whether the backing store has been created yet.
    pub fn is_initialized(&self) -> bool {
        self.inner.lock().lru.is_some()
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = CacheStats {
            max_bytes: self.max_bytes,
            ..inner.stats.clone()
        };

        if let Some(lru) = inner.lru.as_ref() {
            stats.evictions = lru.evictions();
            stats.total_entries = lru.len();
            stats.used_bytes = lru.used_bytes();
        }
        stats
    }
}

impl<V: SizedValue + Clone> ConcurrentCache<V> {
    // == Get ==
    /// Retrieves a value and marks it as most recently used.
    ///
    /// Returns `None` on a miss, including when nothing was ever added.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock();
        let found = inner
            .lru
            .as_mut()
            .and_then(|lru| lru.get(key).cloned());

        if found.is_some() {
            inner.stats.record_hit();
        } else {
            inner.stats.record_miss();
        }
        found
    }
}

impl<V: SizedValue> Default for ConcurrentCache<V> {
    /// An unbounded cache.
    fn default() -> Self {
        Self::new(0)
    }
}
