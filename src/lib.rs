//! bytecache - A byte-budgeted LRU cache node
//!
//! Holds hot key/value pairs within a configurable byte budget, evicting the
//! least recently used entries when the budget is exceeded.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{ByteView, ConcurrentCache, LruStore, SizedValue};
pub use config::Config;
pub use error::{CacheError, Result};
