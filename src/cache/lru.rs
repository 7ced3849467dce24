//! LRU Store Module
//!
//! Implements the byte-budgeted Least Recently Used container that backs a
//! cache node. The store is single-threaded; wrap it in a
//! [`ConcurrentCache`](crate::cache::ConcurrentCache) to share it.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::cache::entry::{CacheEntry, NodeIndex, NIL};
use crate::cache::SizedValue;

/// Callback fired with the key and value of every evicted entry.
///
/// It runs synchronously on the thread that triggered the eviction, before
/// the mutating call returns.
pub type OnEvicted<V> = Box<dyn FnMut(&str, &V) + Send>;

// == LRU Store ==
/// Recency-ordered key/value store bounded by a byte budget.
///
/// Entries live in an arena and are threaded into a doubly-linked list:
/// - `head` = most recently used
/// - `tail` = least recently used (next eviction candidate)
///
/// The index maps each key to its arena slot, so lookups, moves to the front
/// and removals are all O(1). Slots freed by eviction are recycled.
pub struct LruStore<V> {
    /// Node arena, `None` marks a recycled slot
    arena: Vec<Option<CacheEntry<V>>>,
    /// Vacant arena slots
    free: Vec<NodeIndex>,
    /// Key to arena slot
    index: HashMap<String, NodeIndex>,
    head: NodeIndex,
    tail: NodeIndex,
    /// Budget in bytes, 0 = unbounded
    max_bytes: usize,
    /// Sum of `len(key) + value.size()` over resident entries
    used_bytes: usize,
    evictions: u64,
    on_evicted: Option<OnEvicted<V>>,
}

impl<V: SizedValue> LruStore<V> {
    // == Constructor ==
    /// Creates an empty store with the given byte budget (0 = unbounded).
    pub fn new(max_bytes: usize) -> Self {
        Self {
            arena: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: NIL,
            tail: NIL,
            max_bytes,
            used_bytes: 0,
            evictions: 0,
            on_evicted: None,
        }
    }

    /// Creates an empty store that reports every eviction to `on_evicted`.
    pub fn with_on_evicted<F>(max_bytes: usize, on_evicted: F) -> Self
    where
        F: FnMut(&str, &V) + Send + 'static,
    {
        let mut store = Self::new(max_bytes);
        store.on_evicted = Some(Box::new(on_evicted));
        store
    }

    // == Get ==
    /// Looks up a key and marks it as most recently used.
    ///
    /// A miss has no side effect.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        Some(&self.node(idx).value)
    }

    // == Add ==
    /// Inserts or replaces a value and marks the key as most recently used.
    ///
    /// Replacing adjusts the accounted bytes by the difference in value size.
    /// Afterwards, least recently used entries are evicted until the store
    /// fits its budget again. An entry that alone exceeds the budget is kept
    /// as the sole resident; everything else is evicted first.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if let Some(&idx) = self.index.get(&key) {
            let new_size = value.size();
            let node = self.node_mut(idx);
            let old_size = node.value.size();
            node.value = value;
            self.used_bytes = self.used_bytes - old_size + new_size;
            self.move_to_front(idx);
        } else {
            let entry = CacheEntry::new(key.clone(), value);
            self.used_bytes += entry.accounted_size();
            let idx = self.alloc(entry);
            self.index.insert(key, idx);
            self.push_front(idx);
        }

        self.enforce_budget();
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry.
    ///
    /// The entry is unlinked, unindexed and unaccounted before the eviction
    /// callback runs. Returns `None` on an empty store.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        if self.tail == NIL {
            return None;
        }

        let idx = self.tail;
        self.unlink(idx);
        let entry = self.release(idx);
        self.index.remove(&entry.key);
        self.used_bytes -= entry.accounted_size();
        self.evictions += 1;

        debug!(
            key = %entry.key,
            bytes = entry.accounted_size(),
            used_bytes = self.used_bytes,
            "Evicted least recently used entry"
        );

        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(&entry.key, &entry.value);
        }

        Some((entry.key, entry.value))
    }

    // == Length ==
    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Contains ==
    /// Checks for a key without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Peek Oldest ==
    /// Returns the key that would be evicted next.
    pub fn peek_oldest(&self) -> Option<&str> {
        (self.tail != NIL).then(|| self.node(self.tail).key.as_str())
    }

    // == Keys ==
    /// Returns resident keys from most to least recently used.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while cursor != NIL {
            let node = self.node(cursor);
            keys.push(node.key.as_str());
            cursor = node.next;
        }
        keys
    }

    /// Returns the bytes currently charged against the budget.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Returns the configured budget, 0 = unbounded.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Returns how many entries have been evicted since creation.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    // == Budget ==
    fn over_budget(&self) -> bool {
        self.max_bytes != 0 && self.used_bytes > self.max_bytes
    }

    fn enforce_budget(&mut self) {
        // The most recent entry is never evicted to satisfy its own size.
        while self.over_budget() && self.len() > 1 {
            self.remove_oldest();
        }

        if self.over_budget() {
            warn!(
                used_bytes = self.used_bytes,
                max_bytes = self.max_bytes,
                "Single entry exceeds the cache budget"
            );
        }
    }

    // == Arena ==
    fn node(&self, idx: NodeIndex) -> &CacheEntry<V> {
        self.arena[idx]
            .as_ref()
            .expect("linked index points at a vacant slot")
    }

    fn node_mut(&mut self, idx: NodeIndex) -> &mut CacheEntry<V> {
        self.arena[idx]
            .as_mut()
            .expect("linked index points at a vacant slot")
    }

    fn alloc(&mut self, entry: CacheEntry<V>) -> NodeIndex {
        match self.free.pop() {
            Some(idx) => {
                self.arena[idx] = Some(entry);
                idx
            }
            None => {
                self.arena.push(Some(entry));
                self.arena.len() - 1
            }
        }
    }

    fn release(&mut self, idx: NodeIndex) -> CacheEntry<V> {
        let entry = self.arena[idx]
            .take()
            .expect("released index points at a vacant slot");
        self.free.push(idx);
        entry
    }

    // == Linked List ==
    fn unlink(&mut self, idx: NodeIndex) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };

        if prev != NIL {
            self.node_mut(prev).next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.node_mut(next).prev = prev;
        } else {
            self.tail = prev;
        }

        let node = self.node_mut(idx);
        node.prev = NIL;
        node.next = NIL;
    }

    fn push_front(&mut self, idx: NodeIndex) {
        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = NIL;
            node.next = old_head;
        }

        if old_head != NIL {
            self.node_mut(old_head).prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }

    fn move_to_front(&mut self, idx: NodeIndex) {
        if self.head == idx {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }
}

impl<V> fmt::Debug for LruStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("len", &self.index.len())
            .field("used_bytes", &self.used_bytes)
            .field("max_bytes", &self.max_bytes)
            .field("evictions", &self.evictions)
            .field("on_evicted", &self.on_evicted.is_some())
            .finish()
    }
}
