//! Disk Adapter
//!
//! Keeps an in-memory mirror of a JSON cache file. The mirror is loaded once
//! at construction and written back wholesale when dirty, on `flush`, `close`
//! or drop.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::adapters::{priority, Adapter, AdapterKind, AdapterSettings};
use crate::cache::{system_clock, CacheEntry, SharedClock};
use crate::error::{CacheError, Result};

// == Public Constants ==
/// Directory used when the settings name none
pub const DEFAULT_DIRECTORY: &str = "cache";

/// File name used when the settings name none
pub const DEFAULT_FILE_NAME: &str = "cache.json";

// == On-disk Format ==
/// One record of the array written on flush.
#[derive(Debug, Serialize)]
struct StoredEntry<'a> {
    key: &'a str,
    value: &'a Value,
    #[serde(rename = "expiresAt")]
    expires_at: u64,
}

#[derive(Debug, Deserialize)]
struct LoadedEntry {
    key: String,
    value: Value,
    #[serde(rename = "expiresAt", default)]
    expires_at: u64,
}

#[derive(Debug, Deserialize)]
struct KeyedEntry {
    #[serde(alias = "val")]
    value: Value,
    #[serde(rename = "expiresAt", default)]
    expires_at: u64,
}

/// Accepted file shapes: an array of records, or an object keyed by cache key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CacheFile {
    Entries(Vec<LoadedEntry>),
    Keyed(HashMap<String, KeyedEntry>),
}

impl CacheFile {
    fn into_mirror(self) -> BTreeMap<String, CacheEntry> {
        match self {
            CacheFile::Entries(entries) => entries
                .into_iter()
                .map(|e| {
                    let entry = CacheEntry {
                        value: e.value,
                        expires_at: e.expires_at,
                    };
                    (e.key, entry)
                })
                .collect(),
            CacheFile::Keyed(entries) => entries
                .into_iter()
                .map(|(key, e)| {
                    let entry = CacheEntry {
                        value: e.value,
                        expires_at: e.expires_at,
                    };
                    (key, entry)
                })
                .collect(),
        }
    }
}

// == Disk Adapter ==
/// File-backed adapter with TTL and deferred write-back.
#[derive(Debug)]
pub struct DiskAdapter {
    /// Backing file
    path: PathBuf,
    /// In-memory mirror, authoritative between load and flush
    entries: BTreeMap<String, CacheEntry>,
    /// Set by every mutation, cleared by a successful flush
    dirty: bool,
    clock: SharedClock,
}

impl DiskAdapter {
    // == Constructors ==
    /// Opens the cache file named by `settings` using the wall clock.
    ///
    /// # Settings
    /// - `directory` - Containing directory (default: `cache`)
    /// - `fileName` - File name inside it (default: `cache.json`; `filename` is accepted too)
    pub fn new(settings: &AdapterSettings) -> Result<Self> {
        Self::with_clock(settings, system_clock())
    }

    /// Like [`DiskAdapter::new`] with an explicit time source.
    pub fn with_clock(settings: &AdapterSettings, clock: SharedClock) -> Result<Self> {
        let directory = settings.string_or("directory", DEFAULT_DIRECTORY)?;
        let file_name = match settings.string("fileName")? {
            Some(name) => name,
            None => settings.string_or("filename", DEFAULT_FILE_NAME)?,
        };

        if file_name.trim().is_empty() {
            return Err(CacheError::Configuration(
                "disk adapter 'fileName' cannot be empty".to_string(),
            ));
        }

        Self::open(Path::new(directory).join(file_name), clock)
    }

    /// Opens (or creates) the cache file at `path`.
    ///
    /// A missing file is created empty. A file that does not parse is a
    /// [`CacheError::CorruptCacheFile`]; it is left untouched on disk.
    pub fn open(path: impl Into<PathBuf>, clock: SharedClock) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
                debug!("Created cache directory {}", parent.display());
            }
        }

        let entries = if path.exists() {
            load_mirror(&path)?
        } else {
            fs::File::create(&path).map_err(|e| CacheError::io(&path, e))?;
            BTreeMap::new()
        };

        info!(
            "Disk cache opened at {} with {} entries",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries,
            dirty: false,
            clock,
        })
    }

    // == Close ==
    /// Flushes pending changes and releases the adapter, reporting any write failure.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    // == Accessors ==
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the mirror has changes not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of entries in the mirror, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Sweep ==
    /// Drops every entry expired at the current instant. Returns how many went.
    fn sweep_expired(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }
}

/// Reads and parses the backing file. Empty or whitespace-only content is an empty store.
fn load_mirror(path: &Path) -> Result<BTreeMap<String, CacheEntry>> {
    let contents = fs::read_to_string(path).map_err(|e| CacheError::io(path, e))?;

    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let file: CacheFile =
        serde_json::from_str(&contents).map_err(|e| CacheError::CorruptCacheFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    Ok(file.into_mirror())
}

/// Replaces `path` with `contents` via a sibling temp file, so a crash mid-write
/// leaves the previous file intact.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CacheError::io(dir, e))?;
    tmp.write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| CacheError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| CacheError::io(path, e.error))?;
    Ok(())
}

impl Adapter for DiskAdapter {
    fn name(&self) -> &'static str {
        Self::ID
    }

    fn get(&mut self, key: &str) -> Result<Option<Value>> {
        let now = self.clock.now();

        let expired = match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            self.entries.remove(key);
            self.dirty = true;
            debug!("Evicted expired key '{}' on read", key);
            return Ok(None);
        }

        Ok(self.entries.get(key).map(|entry| entry.value.clone()))
    }

    fn set(&mut self, key: &str, value: Value, ttl: u64) -> Result<()> {
        let entry = CacheEntry::new(value, ttl, self.clock.now());
        self.entries.insert(key.to_string(), entry);
        self.dirty = true;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        self.dirty = true;
        Ok(())
    }

    fn purge(&mut self) -> Result<()> {
        self.entries.clear();
        self.dirty = true;
        Ok(())
    }

    // == Flush ==
    /// Writes the mirror back iff it is dirty, after sweeping expired entries.
    /// A clean mirror performs no I/O.
    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let swept = self.sweep_expired();

        let records: Vec<StoredEntry<'_>> = self
            .entries
            .iter()
            .map(|(key, entry)| StoredEntry {
                key,
                value: &entry.value,
                expires_at: entry.expires_at,
            })
            .collect();
        let json = serde_json::to_string(&records)?;

        write_atomically(&self.path, json.as_bytes())?;
        self.dirty = false;

        debug!(
            "Flushed {} entries to {} ({} expired swept)",
            self.entries.len(),
            self.path.display(),
            swept
        );
        Ok(())
    }
}

impl AdapterKind for DiskAdapter {
    const ID: &'static str = "disk";

    fn priority() -> i32 {
        priority::DISK
    }

    fn usable() -> bool {
        true
    }

    fn from_settings(settings: &AdapterSettings) -> Result<Self> {
        Self::new(settings)
    }
}

impl Drop for DiskAdapter {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            warn!("Failed to flush disk cache on drop: {}", err);
        }
    }
}
