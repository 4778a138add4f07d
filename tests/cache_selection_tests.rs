//! Integration Tests for adapter selection and the cache facade
//!
//! Drives the public API only: registries, catalogs, the manager and `Cache`.

use std::fs;

use serde_json::{json, Value};
use tempfile::TempDir;
use uniform_cache::adapters::{AdapterSettings, DiskAdapter, DummyAdapter, MemoryAdapter};
use uniform_cache::{
    Adapter, AdapterCatalog, AdapterDescriptor, AdapterKind, AdapterManager, AdapterRegistry,
    Cache, CacheError, Generated,
};

// == Helpers ==

fn disk_settings(dir: &TempDir) -> AdapterSettings {
    AdapterSettings::new()
        .with("directory", dir.path().to_string_lossy().to_string())
        .with("fileName", "selection.json")
}

fn unusable() -> bool {
    false
}

/// Memory adapter whose runtime dependency is reported missing.
fn unavailable_memory() -> AdapterDescriptor {
    AdapterDescriptor {
        usable: unusable,
        ..AdapterDescriptor::of::<MemoryAdapter>()
    }
}

/// Disk adapter whose runtime dependency is reported missing.
fn unavailable_disk() -> AdapterDescriptor {
    AdapterDescriptor {
        usable: unusable,
        ..AdapterDescriptor::of::<DiskAdapter>()
    }
}

// == Selection ==

#[test]
fn test_priority_four_beats_always_usable_fallback() {
    let registry = AdapterRegistry::new()
        .with("dummy", AdapterSettings::new())
        .with("memory", AdapterSettings::new().with("prefix", "sel_p1"));

    for _ in 0..5 {
        let cache = Cache::new(registry.clone()).unwrap();
        assert_eq!(cache.adapter_name(), "memory");
    }
}

#[test]
fn test_disk_preferred_over_dummy() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::new()
        .with("dummy", AdapterSettings::new())
        .with("disk", disk_settings(&dir));

    let cache = Cache::new(registry).unwrap();
    assert_eq!(cache.adapter_name(), "disk");
}

#[test]
fn test_fallback_to_dummy_when_others_unusable() {
    let dir = TempDir::new().unwrap();
    let catalog = AdapterCatalog::builtin()
        .with_descriptor(unavailable_memory())
        .with_descriptor(unavailable_disk());
    let registry = AdapterRegistry::new()
        .with("memory", AdapterSettings::new())
        .with("disk", disk_settings(&dir))
        .with("dummy", AdapterSettings::new());

    let manager = AdapterManager::with_catalog(catalog, registry).unwrap();
    let cache = Cache::with_manager(&manager).unwrap();

    assert_eq!(cache.adapter_name(), "dummy");
}

#[test]
fn test_no_usable_adapter_fails_construction() {
    let catalog = AdapterCatalog::new().with_descriptor(unavailable_memory());
    let registry = AdapterRegistry::new().with("memory", AdapterSettings::new());

    let manager = AdapterManager::with_catalog(catalog, registry).unwrap();
    let result = Cache::with_manager(&manager);

    assert!(matches!(result, Err(CacheError::NoSuitableAdapter(_))));
}

#[test]
fn test_empty_registry_fails_construction() {
    let result = Cache::new(AdapterRegistry::new());
    assert!(matches!(result, Err(CacheError::Configuration(_))));
}

#[test]
fn test_installed_but_unconfigured_adapter_is_ignored() {
    // memory is in the builtin catalog and always usable, but not registered.
    let cache = Cache::new(AdapterRegistry::new().with("dummy", AdapterSettings::new())).unwrap();
    assert_eq!(cache.adapter_name(), "dummy");
}

#[test]
fn test_builtin_priorities() {
    assert_eq!(DummyAdapter::priority(), 1);
    assert_eq!(DiskAdapter::priority(), 2);
    assert_eq!(MemoryAdapter::priority(), 4);
}

// == Disk-backed facade ==

#[test]
fn test_corrupt_file_fails_construction() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("selection.json"), r#"{"invalid"#).unwrap();
    let registry = AdapterRegistry::new().with("disk", disk_settings(&dir));

    let result = Cache::new(registry);

    assert!(matches!(result, Err(CacheError::CorruptCacheFile { .. })));
}

#[test]
fn test_delete_flush_reconstruct() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::new().with("disk", disk_settings(&dir));

    let mut cache = Cache::new(registry.clone()).unwrap();
    cache.set("x", "1", 0).unwrap();
    cache.set("y", "2", 0).unwrap();
    cache.delete("x").unwrap();
    cache.close().unwrap();

    let written: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("selection.json")).unwrap())
            .unwrap();
    assert_eq!(written, json!([{"key": "y", "value": "2", "expiresAt": 0}]));

    let mut reopened = Cache::new(registry).unwrap();
    assert_eq!(reopened.get("x").unwrap(), None);
    assert_eq!(reopened.get("y").unwrap(), Some(json!("2")));
}

#[test]
fn test_read_through_survives_restart() {
    let dir = TempDir::new().unwrap();
    let registry = AdapterRegistry::new().with("disk", disk_settings(&dir));

    {
        let mut cache = Cache::new(registry.clone()).unwrap();
        let value = cache
            .get_with("missing", || Generated::forever("gen"))
            .unwrap();
        assert_eq!(value, Some(json!("gen")));
        // dropped without close: the adapter flushes on drop
    }

    let mut cache = Cache::new(registry).unwrap();
    assert_eq!(cache.get("missing").unwrap(), Some(json!("gen")));
}

#[test]
fn test_structured_round_trip_through_facade() {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Profile {
        name: String,
        tags: Vec<String>,
    }

    let dir = TempDir::new().unwrap();
    let mut cache = Cache::new(AdapterRegistry::new().with("disk", disk_settings(&dir))).unwrap();
    let profile = Profile {
        name: "ada".to_string(),
        tags: vec!["admin".to_string()],
    };

    cache.set("profile", &profile, 0).unwrap();

    assert_eq!(cache.get_as::<Profile>("profile").unwrap(), Some(profile));
}

#[test]
fn test_custom_adapter_through_catalog() {
    #[derive(Debug, Default)]
    struct Constant;

    impl Adapter for Constant {
        fn name(&self) -> &'static str {
            "constant"
        }
        fn get(&mut self, _key: &str) -> uniform_cache::Result<Option<Value>> {
            Ok(Some(json!("always")))
        }
        fn set(&mut self, _key: &str, _value: Value, _ttl: u64) -> uniform_cache::Result<()> {
            Ok(())
        }
        fn delete(&mut self, _key: &str) -> uniform_cache::Result<()> {
            Ok(())
        }
        fn purge(&mut self) -> uniform_cache::Result<()> {
            Ok(())
        }
    }

    impl AdapterKind for Constant {
        const ID: &'static str = "constant";
        fn priority() -> i32 {
            7
        }
        fn usable() -> bool {
            true
        }
        fn from_settings(_settings: &AdapterSettings) -> uniform_cache::Result<Self> {
            Ok(Constant)
        }
    }

    let catalog = AdapterCatalog::builtin().with::<Constant>();
    let registry = AdapterRegistry::new()
        .with("constant", AdapterSettings::new())
        .with("memory", AdapterSettings::new().with("prefix", "sel_custom"));

    let manager = AdapterManager::with_catalog(catalog, registry).unwrap();
    let mut cache = Cache::with_manager(&manager).unwrap();

    assert_eq!(cache.adapter_name(), "constant");
    assert_eq!(cache.get("anything").unwrap(), Some(json!("always")));
}
