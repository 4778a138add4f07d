//! Cache Entry Module
//!
//! Defines the stored form of a value together with its expiry instant.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A stored value and the instant it stops being visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Expiration timestamp (Unix seconds), 0 = no expiration
    #[serde(rename = "expiresAt", default)]
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - TTL in seconds, 0 for no expiry
    /// * `now` - Current time in Unix seconds
    pub fn new(value: Value, ttl_seconds: u64, now: u64) -> Self {
        let expires_at = if ttl_seconds == 0 {
            0
        } else {
            now.saturating_add(ttl_seconds)
        };

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now` reaches its expiration instant, so a
    /// 1 second TTL is gone exactly one second after it was written.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at != 0 && self.expires_at <= now
    }
}
