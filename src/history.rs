//! Translation history persistence.
//!
//! History lives in the shared [`KvStorage`] as one JSON array under the
//! `translationHistory` key (camelCase fields, matching the on-disk format
//! of earlier releases).  Newest entries first, capped at
//! [`MAX_HISTORY_ITEMS`].  Like the cache, history is best-effort: the
//! orchestrator never fails a translation because an entry could not be
//! recorded.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::storage::{KvStorage, StorageError};

/// Storage key holding the serialized history array.
const HISTORY_STORAGE_KEY: &str = "translationHistory";

/// Maximum number of retained entries.
pub const MAX_HISTORY_ITEMS: usize = 50;

// ---------------------------------------------------------------------------
// HistoryEntry
// ---------------------------------------------------------------------------

/// One recorded translation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique id (UUID v4).
    pub id: String,
    /// Source language display label, e.g. `"English"`.
    pub source_language: String,
    /// Target language display label.
    pub target_language: String,
    pub source_text: String,
    pub target_text: String,
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
    pub is_favorite: bool,
    /// ISO code like `"en"`, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language_code: Option<String>,
}

impl HistoryEntry {
    fn is_valid(&self) -> bool {
        !self.id.is_empty()
            && self.timestamp > 0
            && !self.source_language.is_empty()
            && !self.target_language.is_empty()
            && !self.source_text.is_empty()
            && !self.target_text.is_empty()
    }
}

/// Fields the orchestrator supplies when recording a translation; id,
/// timestamp and favorite flag are filled in by the store.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub source_language: String,
    pub target_language: String,
    pub source_text: String,
    pub target_text: String,
    pub source_language_code: Option<String>,
    pub target_language_code: Option<String>,
}

// ---------------------------------------------------------------------------
// HistoryStore
// ---------------------------------------------------------------------------

/// Persistent translation history.
pub struct HistoryStore {
    storage: Arc<dyn KvStorage>,
    clock: Arc<dyn Clock>,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn KvStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// All valid entries, newest first.
    ///
    /// A corrupt payload is discarded (and removed from storage); malformed
    /// individual entries are filtered out.
    pub fn fetch(&self) -> Vec<HistoryEntry> {
        let raw = match self.storage.get(HISTORY_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("history: read failed: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(mut entries) => {
                entries.retain(HistoryEntry::is_valid);
                entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                entries
            }
            Err(e) => {
                log::warn!("history: corrupt payload ({e}); clearing");
                if self.storage.remove(HISTORY_STORAGE_KEY).is_err() {
                    log::warn!("history: failed to clear corrupt payload");
                }
                Vec::new()
            }
        }
    }

    /// Record a new translation and return its id.
    ///
    /// Returns `None` when the entry is invalid (an empty field) or when
    /// storage rejects the write even after quota recovery.  When the
    /// backend reports it is full, the older half of the history is dropped
    /// and the write retried once.
    pub fn append(&self, new: NewHistoryEntry) -> Option<String> {
        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            source_language: new.source_language,
            target_language: new.target_language,
            source_text: new.source_text,
            target_text: new.target_text,
            timestamp: self.clock.now_millis(),
            is_favorite: false,
            source_language_code: new.source_language_code,
            target_language_code: new.target_language_code,
        };

        if !entry.is_valid() {
            log::warn!("history: refusing to record entry with missing fields");
            return None;
        }

        let id = entry.id.clone();
        let mut entries = self.fetch();
        entries.insert(0, entry);
        entries.truncate(MAX_HISTORY_ITEMS);

        match self.write(&entries) {
            Ok(()) => Some(id),
            Err(StorageError::Full) => {
                log::warn!("history: storage full; dropping older half and retrying");
                entries.truncate(MAX_HISTORY_ITEMS / 2);
                match self.write(&entries) {
                    Ok(()) => Some(id),
                    Err(e) => {
                        log::warn!("history: retry failed, entry not recorded: {e}");
                        None
                    }
                }
            }
            Err(e) => {
                log::warn!("history: write failed, entry not recorded: {e}");
                None
            }
        }
    }

    /// Flip the favorite flag on an entry.  Returns `false` when the id is
    /// unknown.
    pub fn toggle_favorite(&self, id: &str) -> bool {
        let mut entries = self.fetch();
        let Some(entry) = entries.iter_mut().find(|e| e.id == id) else {
            log::warn!("history: no entry {id} to favorite");
            return false;
        };
        entry.is_favorite = !entry.is_favorite;

        match self.write(&entries) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("history: favorite toggle not persisted: {e}");
                false
            }
        }
    }

    /// Remove all history.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(HISTORY_STORAGE_KEY) {
            log::warn!("history: clear failed: {e}");
        }
    }

    fn write(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        let payload =
            serde_json::to_string(entries).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.storage.set(HISTORY_STORAGE_KEY, &payload)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
