//! Durable Key/Value Storage
//!
//! Origin-scoped `localStorage`-style backends for the consent record.
//!
//! - [`MemoryStorage`]: in-memory only, lost with the process
//! - [`JsonFileStorage`]: persisted as one JSON object file, rewritten
//!   atomically on every mutation
//! - Per-origin quota: 5 MB (keys + values combined)

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use spin::RwLock;

use crate::error::StorageError;

// ── Constants ───────────────────────────────────────────────

/// Maximum storage per origin (5 MB).
pub const MAX_STORAGE_SIZE: usize = 5 * 1024 * 1024;

// ── Trait ───────────────────────────────────────────────────

/// A durable string key/value store scoped to one origin.
///
/// Writes replace the whole value under a key; there is no partial update.
pub trait DurableStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

// ── Entries ─────────────────────────────────────────────────

/// Key → value map with quota accounting.
#[derive(Debug, Default, Clone)]
struct Entries {
    data: BTreeMap<String, String>,
    /// Current total size (keys + values in bytes).
    current_size: usize,
}

impl Entries {
    fn from_map(data: BTreeMap<String, String>) -> Self {
        let current_size = data.iter().map(|(k, v)| k.len() + v.len()).sum();
        Self { data, current_size }
    }

    fn insert(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let old_entry_size = self
            .data
            .get(key)
            .map(|v| key.len() + v.len())
            .unwrap_or(0);
        let projected = self.current_size - old_entry_size + key.len() + value.len();

        if projected > MAX_STORAGE_SIZE {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                limit: MAX_STORAGE_SIZE,
            });
        }

        self.data.insert(key.to_string(), value.to_string());
        self.current_size = projected;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.data.remove(key) {
            Some(value) => {
                self.current_size = self.current_size.saturating_sub(key.len() + value.len());
                true
            }
            None => false,
        }
    }
}

// ── MemoryStorage ───────────────────────────────────────────

/// In-memory storage for one origin.
#[derive(Debug)]
pub struct MemoryStorage {
    origin: String,
    entries: RwLock<Entries>,
}

impl MemoryStorage {
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            entries: RwLock::new(Entries::default()),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Number of items.
    pub fn length(&self) -> usize {
        self.entries.read().data.len()
    }

    /// Current byte usage.
    pub fn size(&self) -> usize {
        self.entries.read().current_size
    }
}

impl DurableStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.read().data.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.write().insert(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

// ── JsonFileStorage ─────────────────────────────────────────

/// Storage persisted as a flat JSON object (`{"key":"value",...}`).
///
/// Writers are serialized on a blocking mutex for the duration of the file
/// I/O. The entry lock is only taken to snapshot or swap the map, so readers
/// never wait on the disk.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    writer: Mutex<()>,
    entries: RwLock<Entries>,
}

impl JsonFileStorage {
    /// Open the storage file at `path`.
    ///
    /// A missing file opens empty. An unreadable JSON document also opens
    /// empty and is replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(data) => data,
                Err(e) => {
                    log::warn!(
                        "[CDB Consent] Discarding corrupt storage file {}: {}",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            writer: Mutex::new(()),
            entries: RwLock::new(Entries::from_map(data)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize to a temp file next to the target, then rename over it.
    fn persist(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let json = serde_json::to_string(&entries.data)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl DurableStore for JsonFileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.read().data.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = self.entries.read().clone();
        next.insert(key, value)?;
        self.persist(&next)?;
        *self.entries.write() = next;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = self.entries.read().clone();
        if !next.remove(key) {
            return Ok(());
        }
        self.persist(&next)?;
        *self.entries.write() = next;
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────
