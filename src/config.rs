//! Configuration Module
//!
//! Handles loading server configuration and the adapter registry from environment variables.

use std::env;
use std::fs;

use crate::adapters::{AdapterSettings, DEFAULT_DIRECTORY, DEFAULT_FILE_NAME, DEFAULT_PREFIX};
use crate::error::{CacheError, Result};
use crate::manager::AdapterRegistry;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background flush task interval in seconds
    pub flush_interval: u64,
    /// Adapters offered to selection, with their settings
    pub registry: AdapterRegistry,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `FLUSH_INTERVAL` - Flush frequency in seconds (default: 5)
    /// - `CACHE_REGISTRY_FILE` - JSON file holding the whole registry; when set,
    ///   the variables below are ignored
    /// - `CACHE_ADAPTERS` - Comma-separated adapter ids (default: `disk,dummy`)
    /// - `CACHE_DIRECTORY` - Disk adapter directory (default: `cache`)
    /// - `CACHE_FILE_NAME` - Disk adapter file name (default: `cache.json`)
    /// - `CACHE_PREFIX` - Memory adapter namespace (default: `uniform_cache`)
    pub fn from_env() -> Result<Self> {
        let registry = match env::var("CACHE_REGISTRY_FILE") {
            Ok(path) => registry_from_file(&path)?,
            Err(_) => registry_from_env(),
        };

        Ok(Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            flush_interval: env::var("FLUSH_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            registry,
        })
    }
}

fn registry_from_file(path: &str) -> Result<AdapterRegistry> {
    let contents = fs::read_to_string(path).map_err(|e| CacheError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|e| {
        CacheError::Configuration(format!("invalid registry file {}: {}", path, e))
    })
}

fn registry_from_env() -> AdapterRegistry {
    let adapters = env::var("CACHE_ADAPTERS").unwrap_or_else(|_| "disk,dummy".to_string());
    let directory = env::var("CACHE_DIRECTORY").unwrap_or_else(|_| DEFAULT_DIRECTORY.to_string());
    let file_name = env::var("CACHE_FILE_NAME").unwrap_or_else(|_| DEFAULT_FILE_NAME.to_string());
    let prefix = env::var("CACHE_PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string());

    let mut registry = AdapterRegistry::new();
    for id in adapters.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        let settings = match id {
            "disk" => AdapterSettings::new()
                .with("directory", directory.clone())
                .with("fileName", file_name.clone()),
            "memory" => AdapterSettings::new().with("prefix", prefix.clone()),
            _ => AdapterSettings::new(),
        };
        registry.register(id, settings);
    }
    registry
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            flush_interval: 5,
            registry: AdapterRegistry::new()
                .with(
                    "disk",
                    AdapterSettings::new()
                        .with("directory", DEFAULT_DIRECTORY)
                        .with("fileName", DEFAULT_FILE_NAME),
                )
                .with("dummy", AdapterSettings::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.flush_interval, 5);
        assert_eq!(config.registry.ids(), vec!["disk", "dummy"]);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("FLUSH_INTERVAL");
        env::remove_var("CACHE_REGISTRY_FILE");
        env::remove_var("CACHE_ADAPTERS");
        env::remove_var("CACHE_DIRECTORY");
        env::remove_var("CACHE_FILE_NAME");

        let config = Config::from_env().unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.flush_interval, 5);
        assert_eq!(config.registry.ids(), vec!["disk", "dummy"]);

        let disk = config.registry.settings("disk").unwrap();
        assert_eq!(disk.string("directory").unwrap(), Some("cache"));
        assert_eq!(disk.string("fileName").unwrap(), Some("cache.json"));
    }

    #[test]
    fn test_registry_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, r#"{"memory": {"prefix": "svc"}}"#).unwrap();

        let registry = registry_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(registry.ids(), vec!["memory"]);
    }

    #[test]
    fn test_registry_file_must_be_an_object() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, "[1, 2]").unwrap();

        assert!(matches!(
            registry_from_file(path.to_str().unwrap()),
            Err(CacheError::Configuration(_))
        ));
    }
}
