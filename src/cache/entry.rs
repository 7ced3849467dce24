//! Cache Entry Module
//!
//! Defines the arena node that holds one resident key/value pair and its
//! links in the recency list.

use crate::cache::SizedValue;

/// Index of a node inside the store's arena.
pub(crate) type NodeIndex = usize;

/// Link value meaning "no neighbour".
pub(crate) const NIL: NodeIndex = usize::MAX;

// == Cache Entry ==
/// A resident key/value pair.
///
/// `prev` points towards the most recently used end of the list, `next`
/// towards the eviction candidate.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    /// The cache key
    pub key: String,
    /// The stored value
    pub value: V,
    pub prev: NodeIndex,
    pub next: NodeIndex,
}

impl<V: SizedValue> CacheEntry<V> {
    // == Constructor ==
    /// Creates an unlinked entry.
    pub fn new(key: String, value: V) -> Self {
        Self {
            key,
            value,
            prev: NIL,
            next: NIL,
        }
    }

    // == Accounted Size ==
    /// Returns `len(key) + value.size()`, the figure charged to the budget.
    pub fn accounted_size(&self) -> usize {
        accounted_size(&self.key, &self.value)
    }
}

// == Utility Functions ==
/// Returns the number of bytes a key/value pair costs against the budget.
pub fn accounted_size<V: SizedValue>(key: &str, value: &V) -> usize {
    key.len() + value.size()
}
