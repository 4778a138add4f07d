//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Flush: Writes deferred adapter state back at configured intervals

mod flush;

pub use flush::spawn_flush_task;
