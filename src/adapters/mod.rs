//! Adapters Module
//!
//! The capability contract every storage backend satisfies, and the backends
//! this crate ships.

mod disk;
mod dummy;
mod memory;
mod settings;

use std::fmt;

use serde_json::Value;

use crate::error::Result;

pub use disk::{DiskAdapter, DEFAULT_DIRECTORY, DEFAULT_FILE_NAME};
pub use dummy::DummyAdapter;
pub use memory::{MemoryAdapter, DEFAULT_PREFIX};
pub use settings::AdapterSettings;

// == Priorities ==
/// Static ranks of the known backend families. Higher numbers are examined first.
pub mod priority {
    pub const DUMMY: i32 = 1;
    pub const DISK: i32 = 2;
    pub const RELATIONAL: i32 = 3;
    pub const IN_PROCESS: i32 = 4;
    pub const NETWORKED: i32 = 7;
}

// == Adapter Trait ==
/// Operations on a live backend instance.
///
/// A missing or expired key is `Ok(None)`, never an error. `ttl == 0` means
/// the entry never expires.
pub trait Adapter: Send + Sync + fmt::Debug {
    /// Identifier of this backend, as used in the registry.
    fn name(&self) -> &'static str;

    fn get(&mut self, key: &str) -> Result<Option<Value>>;

    fn set(&mut self, key: &str, value: Value, ttl: u64) -> Result<()>;

    /// Removes `key`. Absent keys are not an error.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Removes every entry this adapter owns, and only those.
    fn purge(&mut self) -> Result<()>;

    /// Persists deferred writes. Backends that write through have nothing to do.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

// == Adapter Kind ==
/// Type-level capabilities of a backend, queried before any instance exists.
pub trait AdapterKind: Adapter + Sized + 'static {
    /// Registry identifier.
    const ID: &'static str;

    /// Static rank; must not change during the process lifetime.
    fn priority() -> i32;

    /// Whether the backend's runtime dependency is available. Must not panic.
    fn usable() -> bool;

    fn from_settings(settings: &AdapterSettings) -> Result<Self>;
}
