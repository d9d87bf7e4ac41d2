//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\pocket-translate\
//!   macOS:   ~/Library/Application Support/pocket-translate/
//!   Linux:   ~/.config/pocket-translate/
//!
//! Data dir (cache + history):
//!   Windows: %LOCALAPPDATA%\pocket-translate\
//!   macOS:   ~/Library/Application Support/pocket-translate/
//!   Linux:   ~/.local/share/pocket-translate/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to the persisted translation cache (`cache.json`).
    pub cache_file: PathBuf,
    /// Full path to the persisted translation history (`history.json`).
    pub history_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "pocket-translate";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let cache_file = data_dir.join("cache.json");
        let history_file = data_dir.join("history.json");

        Self {
            config_dir,
            settings_file,
            cache_file,
            history_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
