//! Dummy Adapter
//!
//! Stores nothing. Always usable, lowest priority: the fallback of last resort.

use serde_json::Value;

use crate::adapters::{priority, Adapter, AdapterKind, AdapterSettings};
use crate::error::Result;

/// Adapter that accepts every write and misses every read.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyAdapter;

impl Adapter for DummyAdapter {
    fn name(&self) -> &'static str {
        Self::ID
    }

    fn get(&mut self, _key: &str) -> Result<Option<Value>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: Value, _ttl: u64) -> Result<()> {
        Ok(())
    }

    fn delete(&mut self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn purge(&mut self) -> Result<()> {
        Ok(())
    }
}

impl AdapterKind for DummyAdapter {
    const ID: &'static str = "dummy";

    fn priority() -> i32 {
        priority::DUMMY
    }

    fn usable() -> bool {
        true
    }

    fn from_settings(_settings: &AdapterSettings) -> Result<Self> {
        Ok(DummyAdapter)
    }
}
