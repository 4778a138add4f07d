//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::Cache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, FlushResponse, GetResponse, HealthResponse, PurgeResponse, SetRequest,
    SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Every cache operation needs `&mut Cache` (reads may evict expired
/// entries), so handlers take the write lock except for stats.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RwLock<Cache>>,
}

impl AppState {
    pub fn new(cache: Cache) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Builds the cache by running adapter selection over the configured registry.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = Cache::new(config.registry.clone())?;
        Ok(Self::new(cache))
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    cache.set(&req.key, &req.value, req.ttl)?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let mut cache = state.cache.write().await;
    match cache.get(&key)? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Deleting an absent key succeeds, matching the adapter contract.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.cache.write().await;
    cache.delete(&key)?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /purge
pub async fn purge_handler(State(state): State<AppState>) -> Result<Json<PurgeResponse>> {
    let mut cache = state.cache.write().await;
    cache.purge()?;

    Ok(Json(PurgeResponse::new(cache.adapter_name())))
}

/// Handler for POST /flush
pub async fn flush_handler(State(state): State<AppState>) -> Result<Json<FlushResponse>> {
    let mut cache = state.cache.write().await;
    cache.flush()?;

    Ok(Json(FlushResponse::new(cache.adapter_name())))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::new(cache.adapter_name(), cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
