//! Offline translation cache.
//!
//! Maps `(text, sourceLang, targetLang)` to a translated string with a
//! 7-day TTL, lazy purging on read, and a rate-limited cleanup sweep.
//! Everything in here is best-effort: failures degrade to a cache miss and
//! never reach the orchestrator as errors.

pub mod key;
pub mod store;

pub use key::{cache_key, text_digest, CACHE_PREFIX};
pub use store::{TranslationCache, CACHE_TTL_MS};
