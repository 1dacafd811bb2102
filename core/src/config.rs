//! Visualization configuration persistence
//!
//! Re-exports the shared config types and adds confy-backed load/save for
//! native targets. The browser build receives its config with the page.

use thiserror::Error;

pub use grievance_types::{
    Breakpoint, DEFAULT_SENTINEL, DataSources, LayoutConfig, Margin, SceneConfig, ScrollConfig,
    VizConfig,
};

const APP_NAME: &str = "grievance-scrolly";
const CONFIG_NAME: &str = "config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to store configuration")]
    Store(#[source] confy::ConfyError),

    #[error("failed to locate configuration file")]
    Locate(#[source] confy::ConfyError),
}

/// Extension trait for VizConfig persistence
pub trait VizConfigExt: Sized {
    fn load() -> Self;
    fn save(&self) -> Result<(), ConfigError>;
    fn config_path() -> Result<std::path::PathBuf, ConfigError>;
}

impl VizConfigExt for VizConfig {
    /// Falls back to defaults when the file is missing or unreadable.
    fn load() -> Self {
        match confy::load::<VizConfig>(APP_NAME, CONFIG_NAME) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, using defaults");
                VizConfig::default()
            }
        }
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Store)
    }

    fn config_path() -> Result<std::path::PathBuf, ConfigError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(ConfigError::Locate)
    }
}
