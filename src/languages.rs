//! Supported language catalog.
//!
//! Language codes are ISO-639-1; regional variants such as `zh-CN` resolve
//! to their base code via [`get_language_by_code`].

/// A supported translation language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO-639-1 code, e.g. `"en"`.
    pub code: &'static str,
    /// English display label, e.g. `"English"`.
    pub label: &'static str,
    /// Label in the language itself, e.g. `"Español"`.
    pub native_label: &'static str,
}

/// Default source language on a fresh session.
pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";
/// Default target language on a fresh session.
pub const DEFAULT_TARGET_LANGUAGE: &str = "es";

/// All languages offered by the translator.
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "en", label: "English", native_label: "English" },
    Language { code: "es", label: "Spanish", native_label: "Español" },
    Language { code: "fr", label: "French", native_label: "Français" },
    Language { code: "de", label: "German", native_label: "Deutsch" },
    Language { code: "it", label: "Italian", native_label: "Italiano" },
    Language { code: "pt", label: "Portuguese", native_label: "Português" },
    Language { code: "ja", label: "Japanese", native_label: "日本語" },
    Language { code: "ko", label: "Korean", native_label: "한국어" },
    Language { code: "zh", label: "Chinese", native_label: "中文" },
    Language { code: "ru", label: "Russian", native_label: "Русский" },
    Language { code: "hi", label: "Hindi", native_label: "हिन्दी" },
    Language { code: "ar", label: "Arabic", native_label: "العربية" },
    Language { code: "bn", label: "Bengali", native_label: "বাংলা" },
    Language { code: "nl", label: "Dutch", native_label: "Nederlands" },
    Language { code: "sv", label: "Swedish", native_label: "Svenska" },
    Language { code: "tr", label: "Turkish", native_label: "Türkçe" },
    Language { code: "vi", label: "Vietnamese", native_label: "Tiếng Việt" },
    Language { code: "pl", label: "Polish", native_label: "Polski" },
    Language { code: "id", label: "Indonesian", native_label: "Bahasa Indonesia" },
    Language { code: "th", label: "Thai", native_label: "ไทย" },
];

/// Look up a language by code.
///
/// Regional codes fall back to their base code, so `"zh-CN"` resolves to
/// Chinese and `"pt-BR"` to Portuguese.
pub fn get_language_by_code(code: &str) -> Option<&'static Language> {
    let base = code.split('-').next().unwrap_or(code);
    SUPPORTED_LANGUAGES
        .iter()
        .find(|lang| lang.code == code || lang.code == base)
}

/// Display label for a code, falling back to the raw code for unknown
/// languages (history entries must never be dropped over a label).
pub fn label_for_code(code: &str) -> String {
    get_language_by_code(code)
        .map(|lang| lang.label.to_string())
        .unwrap_or_else(|| code.to_string())
}
