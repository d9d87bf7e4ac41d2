//! Live translation collaborator.
//!
//! The orchestrator depends only on the [`Translator`] trait — an opaque
//! async function from (text, sourceLang, targetLang) to translated text.
//! [`ApiTranslator`] is the production implementation; tests substitute
//! their own mocks.

pub mod client;

pub use client::{ApiTranslator, TranslateError, Translator};

// ---------------------------------------------------------------------------
// TranslationRequest
// ---------------------------------------------------------------------------

/// A validated translation request.
///
/// The identity of a request — for caching and dedup — is the triple
/// `(text, source_lang, target_lang)`; two requests with equal triples are
/// the same request.  Construction trims the text and rejects empty input,
/// so a `TranslationRequest` always carries a non-empty trimmed string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationRequest {
    text: String,
    source_lang: String,
    target_lang: String,
}

impl TranslationRequest {
    /// Build a request, trimming `text`.  Returns `None` when the trimmed
    /// text is empty.
    pub fn new(text: &str, source_lang: &str, target_lang: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            text: trimmed.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    /// `true` when source and target language are the same, in which case
    /// the translation is the text itself.
    pub fn is_identity(&self) -> bool {
        self.source_lang == self.target_lang
    }
}
