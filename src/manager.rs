//! Adapter Manager
//!
//! Chooses the backend a [`Cache`](crate::Cache) will use. Known adapters live
//! in an [`AdapterCatalog`]; the caller's [`AdapterRegistry`] says which of them
//! are configured and with what settings.
//!
//! # Selection
//! 1. Only adapters named in the registry are candidates.
//! 2. Candidates are grouped by priority, highest number first.
//! 3. Within a group, catalog order breaks ties.
//! 4. The first candidate whose `usable()` check passes is constructed.
//! 5. If none passes, selection fails with [`CacheError::NoSuitableAdapter`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::adapters::{
    Adapter, AdapterKind, AdapterSettings, DiskAdapter, DummyAdapter, MemoryAdapter,
};
use crate::error::{CacheError, Result};

// == Adapter Descriptor ==
/// Static description of one backend type.
#[derive(Clone, Copy)]
pub struct AdapterDescriptor {
    pub id: &'static str,
    pub priority: i32,
    pub usable: fn() -> bool,
    pub construct: fn(&AdapterSettings) -> Result<Box<dyn Adapter>>,
}

impl AdapterDescriptor {
    /// Captures the type-level capabilities of `A`.
    pub fn of<A: AdapterKind>() -> Self {
        Self {
            id: A::ID,
            priority: A::priority(),
            usable: A::usable,
            construct: construct_boxed::<A>,
        }
    }
}

fn construct_boxed<A: AdapterKind>(settings: &AdapterSettings) -> Result<Box<dyn Adapter>> {
    Ok(Box::new(A::from_settings(settings)?))
}

impl fmt::Debug for AdapterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterDescriptor")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .finish()
    }
}

// == Adapter Catalog ==
/// Every adapter type this process knows about, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct AdapterCatalog {
    descriptors: Vec<AdapterDescriptor>,
}

impl AdapterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The adapters shipped with this crate.
    pub fn builtin() -> Self {
        Self::new()
            .with::<DummyAdapter>()
            .with::<DiskAdapter>()
            .with::<MemoryAdapter>()
    }

    /// Appends an adapter type.
    pub fn with<A: AdapterKind>(self) -> Self {
        self.with_descriptor(AdapterDescriptor::of::<A>())
    }

    /// Appends a hand-built descriptor. A later descriptor with an existing id replaces it in place.
    pub fn with_descriptor(mut self, descriptor: AdapterDescriptor) -> Self {
        match self.descriptors.iter_mut().find(|d| d.id == descriptor.id) {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
        self
    }

    pub fn get(&self, id: &str) -> Option<&AdapterDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    /// Descriptors ordered for examination: priority descending, discovery order within a priority.
    pub fn ranked(&self) -> Vec<&AdapterDescriptor> {
        let mut groups: BTreeMap<i32, Vec<&AdapterDescriptor>> = BTreeMap::new();
        for descriptor in &self.descriptors {
            groups.entry(descriptor.priority).or_default().push(descriptor);
        }
        groups.into_values().rev().flatten().collect()
    }
}

// == Adapter Registry ==
/// Configured adapters: identifier to settings. Read-only once handed to a manager.
///
/// Deserializes from a JSON object such as `{"disk": {"directory": "cache"}, "dummy": {}}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AdapterRegistry {
    entries: HashMap<String, AdapterSettings>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration; re-registering an id replaces its settings.
    pub fn with(mut self, id: impl Into<String>, settings: AdapterSettings) -> Self {
        self.register(id, settings);
        self
    }

    pub fn register(&mut self, id: impl Into<String>, settings: AdapterSettings) {
        self.entries.insert(id.into(), settings);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn settings(&self, id: &str) -> Option<&AdapterSettings> {
        self.entries.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered identifiers, sorted for stable messages.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

// == Adapter Manager ==
/// Resolves one adapter from a catalog and a registry.
#[derive(Debug, Clone)]
pub struct AdapterManager {
    catalog: AdapterCatalog,
    registry: AdapterRegistry,
}

impl AdapterManager {
    /// Creates a manager over the builtin catalog.
    ///
    /// # Errors
    /// [`CacheError::Configuration`] if the registry is empty.
    pub fn new(registry: AdapterRegistry) -> Result<Self> {
        Self::with_catalog(AdapterCatalog::builtin(), registry)
    }

    pub fn with_catalog(catalog: AdapterCatalog, registry: AdapterRegistry) -> Result<Self> {
        if registry.is_empty() {
            return Err(CacheError::Configuration(
                "at least one adapter must be registered".to_string(),
            ));
        }

        for id in registry.ids() {
            if catalog.get(id).is_none() {
                warn!("Registered adapter '{}' is unknown and will be ignored", id);
            }
        }

        Ok(Self { catalog, registry })
    }

    /// Picks the winning descriptor without constructing it.
    pub fn select(&self) -> Result<&AdapterDescriptor> {
        for descriptor in self.catalog.ranked() {
            if !self.registry.contains(descriptor.id) {
                continue;
            }

            if (descriptor.usable)() {
                debug!(
                    "Adapter '{}' (priority {}) is usable",
                    descriptor.id, descriptor.priority
                );
                return Ok(descriptor);
            }

            debug!(
                "Adapter '{}' (priority {}) is not usable, trying next",
                descriptor.id, descriptor.priority
            );
        }

        Err(CacheError::NoSuitableAdapter(self.registry.ids().join(", ")))
    }

    /// Selects and constructs the adapter with its registered settings.
    pub fn get_adapter(&self) -> Result<Box<dyn Adapter>> {
        let descriptor = self.select()?;
        let settings = self
            .registry
            .settings(descriptor.id)
            .cloned()
            .unwrap_or_default();

        let adapter = (descriptor.construct)(&settings)?;
        info!(
            "Selected cache adapter '{}' (priority {})",
            descriptor.id, descriptor.priority
        );
        Ok(adapter)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[derive(Debug)]
    struct Stub(&'static str);

    impl Adapter for Stub {
        fn name(&self) -> &'static str {
            self.0
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

    fn yes() -> bool {
        true
    }

    fn no() -> bool {
        false
    }

    fn build_fast(_: &AdapterSettings) -> Result<Box<dyn Adapter>> {
        Ok(Box::new(Stub("fast")))
    }

    fn build_slow(_: &AdapterSettings) -> Result<Box<dyn Adapter>> {
        Ok(Box::new(Stub("slow")))
    }

    fn build_twin(_: &AdapterSettings) -> Result<Box<dyn Adapter>> {
        Ok(Box::new(Stub("twin")))
    }

    fn descriptor(
        id: &'static str,
        priority: i32,
        usable: fn() -> bool,
        construct: fn(&AdapterSettings) -> Result<Box<dyn Adapter>>,
    ) -> AdapterDescriptor {
        AdapterDescriptor {
            id,
            priority,
            usable,
            construct,
        }
    }

    fn registry(ids: &[&str]) -> AdapterRegistry {
        ids.iter().fold(AdapterRegistry::new(), |reg, id| {
            reg.with(*id, AdapterSettings::new())
        })
    }

    #[test]
    fn test_empty_registry_is_configuration_error() {
        let result = AdapterManager::new(AdapterRegistry::new());
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_highest_priority_usable_wins() {
        let catalog = AdapterCatalog::new()
            .with_descriptor(descriptor("slow", 1, yes, build_slow))
            .with_descriptor(descriptor("fast", 4, yes, build_fast));
        let manager = AdapterManager::with_catalog(catalog, registry(&["slow", "fast"])).unwrap();

        assert_eq!(manager.select().unwrap().id, "fast");
        assert_eq!(manager.get_adapter().unwrap().name(), "fast");
    }

    #[test]
    fn test_falls_back_when_higher_priority_unusable() {
        let catalog = AdapterCatalog::new()
            .with_descriptor(descriptor("fast", 4, no, build_fast))
            .with_descriptor(descriptor("slow", 1, yes, build_slow));
        let manager = AdapterManager::with_catalog(catalog, registry(&["fast", "slow"])).unwrap();

        assert_eq!(manager.select().unwrap().id, "slow");
    }

    #[test]
    fn test_unregistered_adapter_never_selected() {
        let catalog = AdapterCatalog::new()
            .with_descriptor(descriptor("fast", 4, yes, build_fast))
            .with_descriptor(descriptor("slow", 1, yes, build_slow));
        let manager = AdapterManager::with_catalog(catalog, registry(&["slow"])).unwrap();

        assert_eq!(manager.select().unwrap().id, "slow");
    }

    #[test]
    fn test_no_usable_adapter() {
        let catalog = AdapterCatalog::new()
            .with_descriptor(descriptor("fast", 4, no, build_fast))
            .with_descriptor(descriptor("slow", 1, no, build_slow));
        let manager = AdapterManager::with_catalog(catalog, registry(&["fast", "slow"])).unwrap();

        assert!(matches!(
            manager.get_adapter(),
            Err(CacheError::NoSuitableAdapter(_))
        ));
    }

    #[test]
    fn test_tie_broken_by_catalog_order() {
        let catalog = AdapterCatalog::new()
            .with_descriptor(descriptor("twin", 3, yes, build_twin))
            .with_descriptor(descriptor("fast", 3, yes, build_fast));
        let manager = AdapterManager::with_catalog(catalog, registry(&["fast", "twin"])).unwrap();

        for _ in 0..10 {
            assert_eq!(manager.select().unwrap().id, "twin");
        }
    }

    #[test]
    fn test_tie_skips_unusable_sibling() {
        let catalog = AdapterCatalog::new()
            .with_descriptor(descriptor("twin", 3, no, build_twin))
            .with_descriptor(descriptor("fast", 3, yes, build_fast))
            .with_descriptor(descriptor("slow", 1, yes, build_slow));
        let manager =
            AdapterManager::with_catalog(catalog, registry(&["twin", "fast", "slow"])).unwrap();

        assert_eq!(manager.select().unwrap().id, "fast");
    }

    #[test]
    fn test_builtin_ranking() {
        let ranked: Vec<&str> = AdapterCatalog::builtin()
            .ranked()
            .into_iter()
            .map(|d| d.id)
            .collect();

        assert_eq!(ranked, vec!["memory", "disk", "dummy"]);
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let manager = AdapterManager::new(registry(&["redis", "dummy"])).unwrap();
        assert_eq!(manager.select().unwrap().id, "dummy");
    }

    #[test]
    fn test_only_unknown_ids_fail_selection() {
        let manager = AdapterManager::new(registry(&["redis"])).unwrap();
        assert!(matches!(
            manager.select(),
            Err(CacheError::NoSuitableAdapter(_))
        ));
    }

    #[test]
    fn test_registry_from_json() {
        let registry: AdapterRegistry = serde_json::from_str(
            r#"{"disk": {"directory": "/tmp/cache"}, "dummy": {}}"#,
        )
        .unwrap();

        assert_eq!(registry.ids(), vec!["disk", "dummy"]);
        assert_eq!(
            registry.settings("disk").unwrap().string("directory").unwrap(),
            Some("/tmp/cache")
        );
    }

    #[test]
    fn test_replacing_descriptor_keeps_position() {
        let catalog = AdapterCatalog::new()
            .with_descriptor(descriptor("twin", 3, no, build_twin))
            .with_descriptor(descriptor("fast", 3, yes, build_fast))
            .with_descriptor(descriptor("twin", 3, yes, build_twin));

        assert_eq!(catalog.ranked().len(), 2);
        assert_eq!(catalog.ranked()[0].id, "twin");
    }
}
