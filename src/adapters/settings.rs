//! Adapter Settings
//!
//! String-keyed configuration payload handed to an adapter's constructor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CacheError, Result};

// == Adapter Settings ==
/// Backend-specific options. Unrecognized keys are ignored by every adapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdapterSettings(Map<String, Value>);

impl AdapterSettings {
    /// Creates an empty settings map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    // == Typed Accessors ==
    /// Reads an optional string option. A present but non-string value is a
    /// configuration error rather than a silent default.
    pub fn string(&self, key: &str) -> Result<Option<&str>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(CacheError::Configuration(format!(
                "setting '{}' must be a string, got {}",
                key, other
            ))),
        }
    }

    /// Reads a string option, falling back to `default` when absent.
    pub fn string_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str> {
        Ok(self.string(key)?.unwrap_or(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_or_default() {
        let settings = AdapterSettings::new().with("directory", "/tmp/c");

        assert_eq!(settings.string_or("directory", "cache").unwrap(), "/tmp/c");
        assert_eq!(settings.string_or("fileName", "cache.json").unwrap(), "cache.json");
    }

    #[test]
    fn test_wrong_type_is_configuration_error() {
        let settings = AdapterSettings::new().with("directory", 42);

        let result = settings.string("directory");
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_deserialize_from_json_object() {
        let settings: AdapterSettings =
            serde_json::from_value(json!({"prefix": "app", "ignored": true})).unwrap();

        assert_eq!(settings.string("prefix").unwrap(), Some("app"));
        assert_eq!(settings.string("absent").unwrap(), None);
    }
}
