//! Deterministic cache-key derivation.
//!
//! The digest is the legacy rolling checksum (`acc = acc * 31 + code_unit`
//! on a wrapping 32-bit integer, absolute value) computed over the text's
//! UTF-16 code units, so keys remain bit-compatible with caches written by
//! earlier releases.  It is intentionally weak: a collision produces a
//! wrong cache hit, not a crash, and the resolution path tolerates that.

use crate::translate::TranslationRequest;

/// Namespace prefix shared by every cache key.
pub const CACHE_PREFIX: &str = "translationCache_";

/// Rolling 32-bit checksum of `text` over UTF-16 code units.
pub fn text_digest(text: &str) -> u32 {
    let mut acc: i32 = 0;
    for unit in text.encode_utf16() {
        acc = acc.wrapping_mul(31).wrapping_add(unit as i32);
    }
    acc.unsigned_abs()
}

/// Full storage key for a request:
/// `translationCache_<sourceLang>_<targetLang>_<digest>`.
///
/// Pure function of the request — stable across process restarts.
pub fn cache_key(request: &TranslationRequest) -> String {
    format!(
        "{CACHE_PREFIX}{}_{}_{}",
        request.source_lang(),
        request.target_lang(),
        text_digest(request.text())
    )
}
