//! API Routes
//!
//! Maps the cache facade onto HTTP. Reads and writes go through the one
//! adapter chosen at startup; the response of `/stats` names it.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, flush_handler, get_handler, health_handler, purge_handler, set_handler,
    stats_handler, AppState,
};

/// Builds the router over a shared cache.
///
/// `DELETE /purge` removes every entry the cache owns (for the memory
/// adapter, only its namespace). `POST /flush` writes deferred changes of a
/// disk cache now instead of waiting for the background flush task; it is a
/// no-op when nothing changed. Every request is traced through `tower_http`,
/// and CORS is open so browser dashboards can read `/stats`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/purge", delete(purge_handler))
        .route("/flush", post(flush_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
