//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! [`OfflineModeFlag`] is the runtime handle for the persisted
//! `offline_mode_enabled` toggle: the orchestrator reads the current value
//! at every resolution and subscribers are notified when the settings
//! screen flips it.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::languages::{DEFAULT_SOURCE_LANGUAGE, DEFAULT_TARGET_LANGUAGE};

use super::AppPaths;

// ---------------------------------------------------------------------------
// TranslateConfig
// ---------------------------------------------------------------------------

/// Settings for the live translation API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Base URL of an OpenAI-compatible API endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key — `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"qwen2.5:3b"`, `"gpt-4o-mini"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).  Translation wants determinism.
    pub temperature: f32,
    /// Maximum seconds to wait for a translation response before timing out.
    pub timeout_secs: u64,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "qwen2.5:3b".into(),
            temperature: 0.1,
            timeout_secs: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use pocket_translate::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source language code restored from the previous session.
    pub source_language: String,
    /// Target language code restored from the previous session.
    pub target_language: String,
    /// Whether cached translations may serve requests (and successful live
    /// translations are written through to the cache).
    pub offline_mode_enabled: bool,
    /// Debounce window in milliseconds before a text change commits.
    pub debounce_ms: u64,
    /// Live translation API settings.
    pub translate: TranslateConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_language: DEFAULT_SOURCE_LANGUAGE.into(),
            target_language: DEFAULT_TARGET_LANGUAGE.into(),
            offline_mode_enabled: false,
            debounce_ms: 500,
            translate: TranslateConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// OfflineModeFlag
// ---------------------------------------------------------------------------

/// Observable handle for the offline-mode toggle.
///
/// Backed by a `tokio::sync::watch` channel: [`enabled`](Self::enabled)
/// reads the current value synchronously, [`subscribe`](Self::subscribe)
/// yields a receiver the orchestrator samples at decision time.  Persisting
/// the flipped value back into [`AppConfig`] is the caller's job.
#[derive(Debug)]
pub struct OfflineModeFlag {
    tx: watch::Sender<bool>,
}

impl OfflineModeFlag {
    pub fn new(enabled: bool) -> Self {
        let (tx, _rx) = watch::channel(enabled);
        Self { tx }
    }

    /// Current value of the toggle.
    pub fn enabled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Flip the toggle; subscribers are notified only on actual changes.
    pub fn set(&self, enabled: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current != enabled {
                *current = enabled;
                true
            } else {
                false
            }
        });
        if changed {
            log::info!("offline mode {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    /// Receiver whose `borrow()` always reflects the latest value.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
