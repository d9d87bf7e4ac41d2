//! Configuration: settings persistence, application paths, and the
//! observable offline-mode flag.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, OfflineModeFlag, TranslateConfig};
