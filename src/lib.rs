//! Uniform Cache - one caching API over interchangeable storage backends
//!
//! A [`Cache`] is built from an [`AdapterRegistry`]; the [`AdapterManager`]
//! ranks the registered backends by priority, checks each for usability and
//! hands the first usable one to the cache for its whole lifetime.
//!
//! ```no_run
//! use uniform_cache::{AdapterRegistry, AdapterSettings, Cache, Generated};
//!
//! # fn main() -> uniform_cache::Result<()> {
//! let registry = AdapterRegistry::new()
//!     .with("disk", AdapterSettings::new().with("directory", "/tmp/cache"))
//!     .with("dummy", AdapterSettings::new());
//!
//! let mut cache = Cache::new(registry)?;
//! cache.set("greeting", "hello", 60)?;
//! let answer = cache.get_with("answer", || Generated::forever(42))?;
//! cache.close()?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod tasks;

pub use adapters::{Adapter, AdapterKind, AdapterSettings};
pub use api::AppState;
pub use cache::{Cache, CacheItem, Generated};
pub use config::Config;
pub use error::{CacheError, Result};
pub use manager::{AdapterCatalog, AdapterDescriptor, AdapterManager, AdapterRegistry};
pub use tasks::spawn_flush_task;
