//! Cache Facade
//!
//! The public entry point. Owns the single adapter resolved at construction
//! and forwards every operation to it.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::adapters::Adapter;
use crate::cache::{encode, CacheItem, CacheStats};
use crate::error::Result;
use crate::manager::{AdapterManager, AdapterRegistry};

// == Generated Value ==
/// What a read-through generator produces on a miss.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    /// TTL in seconds, 0 for no expiry
    pub ttl: u64,
}

impl<T> Generated<T> {
    pub fn new(value: T, ttl: u64) -> Self {
        Self { value, ttl }
    }

    /// A value that never expires.
    pub fn forever(value: T) -> Self {
        Self::new(value, 0)
    }
}

// == Cache ==
/// Uniform cache over whichever backend won selection.
#[derive(Debug)]
pub struct Cache {
    adapter: Box<dyn Adapter>,
    stats: CacheStats,
}

impl Cache {
    // == Constructors ==
    /// Selects an adapter from `registry` using the builtin catalog.
    ///
    /// # Errors
    /// - [`CacheError::Configuration`](crate::CacheError::Configuration) for an empty registry
    /// - [`CacheError::NoSuitableAdapter`](crate::CacheError::NoSuitableAdapter) if nothing registered is usable
    /// - any construction error of the selected adapter
    pub fn new(registry: AdapterRegistry) -> Result<Self> {
        Self::with_manager(&AdapterManager::new(registry)?)
    }

    /// Selects an adapter through an explicit manager.
    pub fn with_manager(manager: &AdapterManager) -> Result<Self> {
        Ok(Self::from_adapter(manager.get_adapter()?))
    }

    /// Wraps an already constructed adapter, bypassing selection.
    pub fn from_adapter(adapter: Box<dyn Adapter>) -> Self {
        Self {
            adapter,
            stats: CacheStats::new(),
        }
    }

    /// Identifier of the adapter in use.
    pub fn adapter_name(&self) -> &'static str {
        self.adapter.name()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    // == Reads ==
    /// Returns the value stored under `key`, or `None` on a miss.
    pub fn get(&mut self, key: &str) -> Result<Option<Value>> {
        let value = self.adapter.get(key)?;
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        Ok(value)
    }

    /// Like [`Cache::get`] but carries hit metadata.
    pub fn get_item(&mut self, key: &str) -> Result<CacheItem> {
        let value = self.get(key)?;
        Ok(CacheItem::from_lookup(key, value))
    }

    /// Reads and decodes the value under `key`.
    pub fn get_as<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        self.get_item(key)?.value_as()
    }

    /// Read-through lookup.
    ///
    /// On a miss the generator runs, its result is stored with the TTL it
    /// chose, and the key is read back so the caller sees exactly what the
    /// backend holds. A backend that stores nothing yields `None`.
    pub fn get_with<T, F>(&mut self, key: &str, generator: F) -> Result<Option<Value>>
    where
        T: Serialize,
        F: FnOnce() -> Generated<T>,
    {
        if let Some(value) = self.get(key)? {
            return Ok(Some(value));
        }

        let Generated { value, ttl } = generator();
        self.set(key, &value, ttl)?;
        self.stats.record_generated();
        debug!("Generated value for '{}' (ttl {}s)", key, ttl);

        self.adapter.get(key)
    }

    // == Writes ==
    /// Stores `value` under `key`; `ttl == 0` means no expiry.
    ///
    /// A value that cannot be encoded, including one holding NaN or an
    /// infinity, fails here and leaves the cache unchanged.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T, ttl: u64) -> Result<()> {
        let value = encode::to_value(value)?;
        self.adapter.set(key, value, ttl)
    }

    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.adapter.delete(key)
    }

    pub fn purge(&mut self) -> Result<()> {
        self.adapter.purge()
    }

    // == Persistence ==
    /// Persists deferred writes of the underlying adapter.
    pub fn flush(&mut self) -> Result<()> {
        self.adapter.flush()
    }

    /// Flushes and releases the adapter, reporting any write failure.
    pub fn close(mut self) -> Result<()> {
        self.adapter.flush()
    }
}
