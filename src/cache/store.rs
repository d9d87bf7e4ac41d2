//! Translation cache with expiry, eviction and corruption recovery.
//!
//! The cache is an optimization, never a dependency: every failure path
//! degrades to a cache miss or a dropped write, and nothing here returns an
//! error to the orchestrator.
//!
//! # On-disk format
//!
//! Entries live in the shared [`KvStorage`] under
//! `translationCache_<sourceLang>_<targetLang>_<digest>` with a JSON value
//! `{"targetText": …, "timestamp": …}`.  The reserved key
//! `translationCache_lastCleanup` records when the last sweep ran.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::storage::{KvStorage, StorageError};
use crate::translate::TranslationRequest;

use super::key::{cache_key, CACHE_PREFIX};

/// Entries older than this are stale.
pub const CACHE_TTL_MS: u64 = 7 * 24 * 60 * 60 * 1000; // 7 days

/// Minimum interval between non-forced cleanup sweeps.
const CLEANUP_INTERVAL_MS: u64 = 60 * 60 * 1000; // 1 hour

/// Reserved key holding the timestamp of the last sweep.
const LAST_CLEANUP_KEY: &str = "translationCache_lastCleanup";

// ---------------------------------------------------------------------------
// CachedTranslation
// ---------------------------------------------------------------------------

/// Persisted cache entry payload.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedTranslation {
    target_text: String,
    timestamp: u64,
}

// ---------------------------------------------------------------------------
// TranslationCache
// ---------------------------------------------------------------------------

/// Key-value cache mapping a [`TranslationRequest`] to its translation.
pub struct TranslationCache {
    storage: Arc<dyn KvStorage>,
    clock: Arc<dyn Clock>,
}

impl TranslationCache {
    pub fn new(storage: Arc<dyn KvStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Look up a cached translation.
    ///
    /// Returns the value only if present and unexpired.  As a side effect,
    /// an expired or malformed entry found under this key is removed.
    /// Storage errors are treated as a miss.
    pub fn get(&self, request: &TranslationRequest) -> Option<String> {
        let key = cache_key(request);

        let raw = match self.storage.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("cache: read failed for {key}: {e}");
                return None;
            }
        };

        match serde_json::from_str::<CachedTranslation>(&raw) {
            Ok(entry) => {
                let now = self.clock.now_millis();
                if now.saturating_sub(entry.timestamp) < CACHE_TTL_MS {
                    Some(entry.target_text)
                } else {
                    self.remove_silently(&key);
                    None
                }
            }
            Err(e) => {
                log::warn!("cache: corrupt entry at {key} ({e}); removing");
                self.remove_silently(&key);
                None
            }
        }
    }

    /// Store a translation with the current timestamp.
    ///
    /// When the underlying storage is full the cache forces a cleanup sweep
    /// (ignoring the hourly rate limit) and retries exactly once; a failed
    /// retry drops the write silently.
    pub fn put(&self, request: &TranslationRequest, target_text: &str) {
        let key = cache_key(request);
        let entry = CachedTranslation {
            target_text: target_text.to_string(),
            timestamp: self.clock.now_millis(),
        };
        let payload = match serde_json::to_string(&entry) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("cache: failed to serialise entry: {e}");
                return;
            }
        };

        match self.storage.set(&key, &payload) {
            Ok(()) => {
                // Opportunistic sweep, rate-limited to once per hour.
                self.cleanup(false);
            }
            Err(first_err) => {
                log::warn!("cache: write failed ({first_err}); forcing cleanup and retrying");
                self.cleanup(true);
                if let Err(retry_err) = self.storage.set(&key, &payload) {
                    log::warn!("cache: retry failed, dropping write: {retry_err}");
                }
            }
        }
    }

    /// Sweep all entries, removing those past the TTL or failing to parse.
    ///
    /// Skipped entirely when `!force` and less than an hour has passed since
    /// the previous sweep.  Returns the number of entries removed.
    pub fn cleanup(&self, force: bool) -> usize {
        let now = self.clock.now_millis();

        if !force {
            let last = self
                .storage
                .get(LAST_CLEANUP_KEY)
                .ok()
                .flatten()
                .and_then(|raw| raw.parse::<u64>().ok())
                .unwrap_or(0);
            if now.saturating_sub(last) < CLEANUP_INTERVAL_MS {
                return 0;
            }
        }

        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!("cache: cleanup could not enumerate keys: {e}");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            if !key.starts_with(CACHE_PREFIX) || key == LAST_CLEANUP_KEY {
                continue;
            }
            let Ok(Some(raw)) = self.storage.get(&key) else {
                continue;
            };
            let stale = match serde_json::from_str::<CachedTranslation>(&raw) {
                Ok(entry) => now.saturating_sub(entry.timestamp) >= CACHE_TTL_MS,
                Err(_) => true, // corrupt
            };
            if stale {
                self.remove_silently(&key);
                removed += 1;
            }
        }

        if let Err(e) = self.storage.set(LAST_CLEANUP_KEY, &now.to_string()) {
            log::warn!("cache: could not record cleanup time: {e}");
        }
        if removed > 0 {
            log::debug!("cache: cleanup removed {removed} entries");
        }
        removed
    }

    /// Remove every cache entry, including the cleanup marker.
    pub fn clear(&self) -> usize {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!("cache: clear could not enumerate keys: {e}");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            if key.starts_with(CACHE_PREFIX) {
                self.remove_silently(&key);
                removed += 1;
            }
        }
        removed
    }

    fn remove_silently(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            log::warn!("cache: failed to remove {key}: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::ManualClock;
    use crate::storage::MemoryStorage;

    const DAY_MS: u64 = 24 * 60 * 60 * 1000;
    const HOUR_MS: u64 = 60 * 60 * 1000;

    fn req(text: &str) -> TranslationRequest {
        TranslationRequest::new(text, "en", "es").unwrap()
    }

    fn make_cache(capacity: Option<usize>) -> (TranslationCache, Arc<MemoryStorage>, Arc<ManualClock>) {
        let storage = Arc::new(match capacity {
            Some(cap) => MemoryStorage::with_capacity(cap),
            None => MemoryStorage::new(),
        });
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let cache = TranslationCache::new(
            Arc::clone(&storage) as Arc<dyn KvStorage>,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        (cache, storage, clock)
    }

    #[test]
    fn put_then_get_round_trips() {
        let (cache, _storage, _clock) = make_cache(None);
        cache.put(&req("hello"), "hola");
        assert_eq!(cache.get(&req("hello")).as_deref(), Some("hola"));
    }

    #[test]
    fn miss_on_unknown_request() {
        let (cache, _storage, _clock) = make_cache(None);
        assert_eq!(cache.get(&req("hello")), None);
    }

    #[test]
    fn entry_expires_after_ttl() {
        let (cache, storage, clock) = make_cache(None);
        cache.put(&req("hello"), "hola");

        clock.advance(7 * DAY_MS);
        assert_eq!(cache.get(&req("hello")), None);

        // The expired entry must have been purged on read.
        let key = cache_key(&req("hello"));
        assert_eq!(storage.get(&key).unwrap(), None);
    }

    #[test]
    fn entry_survives_just_under_ttl() {
        let (cache, _storage, clock) = make_cache(None);
        cache.put(&req("hello"), "hola");

        clock.advance(7 * DAY_MS - 1);
        assert_eq!(cache.get(&req("hello")).as_deref(), Some("hola"));
    }

    #[test]
    fn corrupt_entry_is_removed_on_read() {
        let (cache, storage, _clock) = make_cache(None);
        let key = cache_key(&req("hello"));
        storage.set(&key, "{not valid json").unwrap();

        assert_eq!(cache.get(&req("hello")), None);
        assert_eq!(storage.get(&key).unwrap(), None);
    }

    #[test]
    fn cleanup_is_rate_limited_unless_forced() {
        let (cache, storage, clock) = make_cache(None);

        // Record a sweep, then plant an already-expired entry behind the
        // cache's back.
        cache.cleanup(true);
        let key = cache_key(&req("old"));
        let stale = format!(
            r#"{{"targetText":"viejo","timestamp":{}}}"#,
            clock.now_millis() - 8 * DAY_MS
        );
        storage.set(&key, &stale).unwrap();

        // Within the hour: rate-limited, nothing removed.
        assert_eq!(cache.cleanup(false), 0);
        assert!(storage.get(&key).unwrap().is_some());

        // Forced: removed regardless of the rate limit.
        assert_eq!(cache.cleanup(true), 1);
        assert_eq!(storage.get(&key).unwrap(), None);
    }

    #[test]
    fn cleanup_runs_again_after_an_hour() {
        let (cache, storage, clock) = make_cache(None);
        cache.cleanup(true);

        let key = cache_key(&req("old"));
        let stale = format!(
            r#"{{"targetText":"viejo","timestamp":{}}}"#,
            clock.now_millis() - 8 * DAY_MS
        );
        storage.set(&key, &stale).unwrap();

        clock.advance(HOUR_MS);
        assert_eq!(cache.cleanup(false), 1);
    }

    #[test]
    fn cleanup_removes_corrupt_entries() {
        let (cache, storage, _clock) = make_cache(None);
        storage.set("translationCache_en_fr_123", "garbage").unwrap();

        assert_eq!(cache.cleanup(true), 1);
        assert_eq!(storage.get("translationCache_en_fr_123").unwrap(), None);
    }

    #[test]
    fn cleanup_ignores_foreign_keys() {
        let (cache, storage, _clock) = make_cache(None);
        storage.set("translationHistory", "[]").unwrap();

        assert_eq!(cache.cleanup(true), 0);
        assert!(storage.get("translationHistory").unwrap().is_some());
    }

    #[test]
    fn full_storage_triggers_forced_cleanup_and_retry() {
        // Room for two entries: one expired entry plus the cleanup marker.
        let (cache, storage, clock) = make_cache(Some(2));

        let stale_key = cache_key(&req("old"));
        let stale = format!(
            r#"{{"targetText":"viejo","timestamp":{}}}"#,
            clock.now_millis() - 8 * DAY_MS
        );
        storage.set(&stale_key, &stale).unwrap();
        storage.set(LAST_CLEANUP_KEY, "0").unwrap();

        // Storage is now full; the forced sweep must free the expired slot
        // so the retry lands.
        cache.put(&req("fresh"), "fresco");
        assert_eq!(cache.get(&req("fresh")).as_deref(), Some("fresco"));
        assert_eq!(storage.get(&stale_key).unwrap(), None);
    }

    #[test]
    fn failed_retry_drops_the_write_silently() {
        // One slot, occupied by a *fresh* entry cleanup will not evict.
        let (cache, _storage, _clock) = make_cache(Some(1));
        cache.put(&req("first"), "primero");

        // No room and nothing evictable: the write is dropped, not an error.
        cache.put(&req("second"), "segundo");

        assert_eq!(cache.get(&req("first")).as_deref(), Some("primero"));
        assert_eq!(cache.get(&req("second")), None);
    }

    #[test]
    fn clear_removes_all_cache_entries() {
        let (cache, storage, _clock) = make_cache(None);
        cache.put(&req("a"), "1");
        cache.put(&req("b"), "2");
        storage.set("translationHistory", "[]").unwrap();

        let removed = cache.clear();
        assert!(removed >= 2);
        assert_eq!(cache.get(&req("a")), None);
        assert_eq!(cache.get(&req("b")), None);
        // Foreign namespaces untouched.
        assert!(storage.get("translationHistory").unwrap().is_some());
    }
}
