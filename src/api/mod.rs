//! API Module
//!
//! HTTP handlers and routing that expose a [`Cache`](crate::Cache) over REST.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Delete a key
//! - `DELETE /purge` - Remove every entry owned by the cache
//! - `POST /flush` - Persist deferred writes
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
