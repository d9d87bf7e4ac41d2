//! Key-value storage backend for the cache and history layers.
//!
//! [`KvStorage`] is the seam between the translation cache / history store
//! and whatever actually persists the bytes.  [`FileStorage`] keeps a single
//! JSON map on disk (entries survive process restarts); [`MemoryStorage`]
//! backs tests and can enforce a capacity limit to exercise the
//! storage-full recovery path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Errors surfaced by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend has no room for the value (localStorage-style quota).
    #[error("storage is full")]
    Full,

    /// Underlying I/O failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted payload could not be parsed.
    #[error("storage payload corrupt: {0}")]
    Corrupt(String),
}

// ---------------------------------------------------------------------------
// KvStorage trait
// ---------------------------------------------------------------------------

/// String key-value storage with enumeration.
///
/// Implementors must be `Send + Sync`; the cache and history stores share
/// them behind `Arc<dyn KvStorage>`.
pub trait KvStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    /// All keys currently present, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// In-memory storage.
///
/// `with_capacity` caps the number of entries; a `set` of a *new* key beyond
/// the cap fails with [`StorageError::Full`] (overwrites of existing keys
/// always succeed, matching quota behaviour).
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    capacity: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }
}

impl KvStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(cap) = self.capacity {
            if !entries.contains_key(key) && entries.len() >= cap {
                return Err(StorageError::Full);
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// File-backed storage: one JSON object per file, written through on every
/// mutation.
///
/// The map is loaded once at construction; a missing file starts empty and
/// a corrupt file is discarded (the cache is best-effort and history
/// validates entries separately).
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) the store at `path`, creating parent directories as
    /// needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<HashMap<String, String>>(&content) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!(
                        "storage file {} is corrupt ({e}); starting empty",
                        path.display()
                    );
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let content = serde_json::to_string(entries)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KvStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
