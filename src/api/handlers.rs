//! API Handlers
//!
//! HTTP request handlers for each cache node endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::cache::{ByteView, ConcurrentCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{GetResponse, HealthResponse, SetRequest, SetResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// The cache carries its own lock, so handlers share it through a plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache
    pub cache: Arc<ConcurrentCache<ByteView>>,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: ConcurrentCache<ByteView>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ConcurrentCache::new(config.cache_bytes))
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache. Entries larger than the whole
/// budget are rejected rather than flushing the cache.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state
        .cache
        .try_add(req.key.clone(), ByteView::from(req.value))?;
    debug!(key = %req.key, "Stored entry");

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value.to_string())))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
