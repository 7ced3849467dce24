//! Cache Module
//!
//! Provides a byte-budgeted LRU store and the thread-safe cache built on it.

mod concurrent;
mod entry;
mod lru;
mod stats;
mod value;


// Re-export public types
pub use concurrent::ConcurrentCache;
pub use entry::accounted_size;
pub use lru::{LruStore, OnEvicted};
pub use stats::CacheStats;
pub use value::{ByteView, SizedValue};

// == Public Constants ==
/// Default byte budget of a cache node (64 MiB)
pub const DEFAULT_CACHE_BYTES: usize = 2 << 25;

/// Maximum allowed key length in bytes accepted by the HTTP layer
pub const MAX_KEY_LENGTH: usize = 256;
