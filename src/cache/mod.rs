//! Cache Module
//!
//! The facade callers use, plus the value types shared with the adapters.

mod clock;
mod encode;
mod entry;
mod facade;
mod item;
mod stats;


// Re-export public types
pub use clock::{system_clock, Clock, SharedClock, SystemClock};
#[cfg(test)]
pub use clock::ManualClock;
pub use entry::CacheEntry;
pub use facade::{Cache, Generated};
pub use item::CacheItem;
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes for the HTTP surface
pub const MAX_KEY_LENGTH: usize = 256;
