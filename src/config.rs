//! Runtime configuration for the frequency cutoff plugin.
//!
//! The host hands the plugin a configuration directory on startup; the
//! per-speaker settings file lives inside it under a fixed name.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Name of the per-speaker settings file inside the configuration directory.
pub const CONFIG_FILENAME: &str = "frequency_cutoff_plugin.conf";

/// Plugin configuration
///
/// # Example
/// ```
/// use freq_cutoff::config::PluginConfig;
///
/// let config = PluginConfig::new("/tmp/ts3");
/// assert!(config.config_path().ends_with("frequency_cutoff_plugin.conf"));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct PluginConfig {
    /// Directory the host reserves for plugin configuration
    pub config_dir: PathBuf,
    /// File name of the per-speaker settings file
    pub config_filename: String,
}

impl PluginConfig {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            ..Self::default()
        }
    }

    /// Build a configuration that points directly at a settings file.
    pub fn from_file(path: &Path) -> Self {
        let config_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let config_filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| CONFIG_FILENAME.to_string());
        Self {
            config_dir,
            config_filename,
        }
    }

    /// Full path of the settings file
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(&self.config_filename)
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("."),
            config_filename: CONFIG_FILENAME.to_string(),
        }
    }
}
