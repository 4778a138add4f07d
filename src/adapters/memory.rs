//! Memory Adapter
//!
//! In-process accelerator: a process-wide store shared by every `MemoryAdapter`.
//! The store is partitioned by namespace (the adapter's prefix), so `purge`
//! and key lookups never reach across namespaces, whatever the prefixes look like.

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::adapters::{priority, Adapter, AdapterKind, AdapterSettings};
use crate::cache::{system_clock, CacheEntry, SharedClock};
use crate::error::Result;

/// Namespace used when the settings name none
pub const DEFAULT_PREFIX: &str = "uniform_cache";

type Namespace = HashMap<String, CacheEntry>;

static SHARED_STORE: OnceLock<Mutex<HashMap<String, Namespace>>> = OnceLock::new();

fn shared_store() -> &'static Mutex<HashMap<String, Namespace>> {
    SHARED_STORE.get_or_init(|| Mutex::new(HashMap::new()))
}

// == Memory Adapter ==
/// Namespaced view onto the process-wide store.
#[derive(Debug)]
pub struct MemoryAdapter {
    prefix: String,
    clock: SharedClock,
}

impl MemoryAdapter {
    /// # Settings
    /// - `prefix` - Namespace for this adapter's keys (default: `uniform_cache`)
    pub fn new(settings: &AdapterSettings) -> Result<Self> {
        Self::with_clock(settings, system_clock())
    }

    pub fn with_clock(settings: &AdapterSettings, clock: SharedClock) -> Result<Self> {
        let prefix = settings.string_or("prefix", DEFAULT_PREFIX)?;
        Ok(Self {
            prefix: prefix.to_string(),
            clock,
        })
    }

    /// Number of entries held in this adapter's namespace, including expired
    /// ones not yet swept.
    pub fn len(&self) -> usize {
        shared_store()
            .lock()
            .get(&self.prefix)
            .map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Adapter for MemoryAdapter {
    fn name(&self) -> &'static str {
        Self::ID
    }

    fn get(&mut self, key: &str) -> Result<Option<Value>> {
        let now = self.clock.now();
        let mut store = shared_store().lock();
        let Some(namespace) = store.get_mut(&self.prefix) else {
            return Ok(None);
        };

        let expired = match namespace.get(key) {
            None => return Ok(None),
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            namespace.remove(key);
            return Ok(None);
        }

        Ok(namespace.get(key).map(|entry| entry.value.clone()))
    }

    fn set(&mut self, key: &str, value: Value, ttl: u64) -> Result<()> {
        let entry = CacheEntry::new(value, ttl, self.clock.now());
        shared_store()
            .lock()
            .entry(self.prefix.clone())
            .or_default()
            .insert(key.to_string(), entry);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if let Some(namespace) = shared_store().lock().get_mut(&self.prefix) {
            namespace.remove(key);
        }
        Ok(())
    }

    fn purge(&mut self) -> Result<()> {
        let removed = shared_store()
            .lock()
            .remove(&self.prefix)
            .map_or(0, |namespace| namespace.len());
        debug!("Purged {} entries in namespace '{}'", removed, self.prefix);
        Ok(())
    }

    /// Nothing to persist; drops expired entries of this namespace instead.
    fn flush(&mut self) -> Result<()> {
        let now = self.clock.now();
        let mut store = shared_store().lock();
        let Some(namespace) = store.get_mut(&self.prefix) else {
            return Ok(());
        };

        let before = namespace.len();
        namespace.retain(|_, entry| !entry.is_expired(now));
        let swept = before - namespace.len();

        if namespace.is_empty() {
            store.remove(&self.prefix);
        }
        if swept > 0 {
            debug!("Swept {} expired entries in namespace '{}'", swept, self.prefix);
        }
        Ok(())
    }
}

impl AdapterKind for MemoryAdapter {
    const ID: &'static str = "memory";

    fn priority() -> i32 {
        priority::IN_PROCESS
    }

    fn usable() -> bool {
        true
    }

    fn from_settings(settings: &AdapterSettings) -> Result<Self> {
        Self::new(settings)
    }
}
