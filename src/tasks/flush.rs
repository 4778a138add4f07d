//! Flush Task
//!
//! Background task that periodically persists the cache's deferred writes.
//! The facade itself never schedules work; this task belongs to the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::Cache;

/// Spawns a background task that flushes the cache every `flush_interval_secs`.
///
/// Flushing a clean cache is free, so the task does not track dirtiness
/// itself. Failures are logged and retried on the next tick.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_flush_task(cache: Arc<RwLock<Cache>>, flush_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(flush_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting flush task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let result = {
                let mut cache_guard = cache.write().await;
                cache_guard.flush()
            };

            match result {
                Ok(()) => debug!("Flush task: cache persisted"),
                Err(err) => warn!("Flush task: failed to persist cache: {}", err),
            }
        }
    })
}
