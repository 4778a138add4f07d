//! Cache Item Module
//!
//! Lookup result carrying hit/miss metadata alongside the value.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

// == Cache Item ==
/// The outcome of a single lookup.
///
/// Items are only built from an actual adapter result, so `is_hit` always
/// matches whether a value came back.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheItem {
    key: String,
    value: Option<Value>,
}

impl CacheItem {
    /// Builds an item from what the adapter returned for `key`.
    pub(crate) fn from_lookup(key: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// The key that was looked up.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored value, if the lookup hit.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Whether the lookup found a live entry.
    pub fn is_hit(&self) -> bool {
        self.value.is_some()
    }

    /// Decodes the value into `T`. A miss decodes to `None`.
    pub fn value_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match &self.value {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}
