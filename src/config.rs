//! Configuration management for Writeup Notebook
//!
//! Handles loading and validating engine configuration.
//! Configuration is persisted as JSON in the user's configuration directory.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier used for the configuration directory
pub const APP_ID: &str = "writeup-notebook";

/// Configuration file name inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Maximum raw size of a pasted image (in bytes) - 2MB
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Autosave debounce delay in milliseconds
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 30_000;

/// Literal inserted by the Tab key
pub const DEFAULT_INDENT: &str = "  ";

/// Maximum number of tags on a document
pub const MAX_TAGS: usize = 5;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editor configuration
    pub editor: EditorConfig,

    /// Pasted image configuration
    pub images: ImageConfig,

    /// Autosave configuration
    pub autosave: AutosaveConfig,

    /// Outline and viewport configuration
    pub outline: OutlineConfig,
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a JSON file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::LoadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the configuration file path
    pub fn config_path() -> ConfigResult<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE_NAME))
    }

    /// Get the data directory path (default document store)
    pub fn data_dir() -> ConfigResult<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Check values that deserialize fine but make no sense
    pub fn validate(&self) -> ConfigResult<()> {
        if self.images.max_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "images.max_bytes".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let band = (self.outline.band_top, self.outline.band_bottom);
        if !(0.0..=1.0).contains(&band.0) || !(0.0..=1.0).contains(&band.1) {
            return Err(ConfigError::InvalidValue {
                key: "outline".to_string(),
                reason: "band margins must be fractions between 0 and 1".to_string(),
            });
        }
        if band.0 + band.1 > 1.0 {
            return Err(ConfigError::InvalidValue {
                key: "outline".to_string(),
                reason: format!("band margins overlap ({} + {} > 1)", band.0, band.1),
            });
        }

        Ok(())
    }
}

/// Editor-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Text inserted when Tab is pressed
    pub indent: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
        }
    }
}

/// Pasted image configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Maximum raw payload size in bytes
    pub max_bytes: usize,

    /// Prefix of the generated alt text (`image-<millis>`)
    pub alt_prefix: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_bytes: MAX_IMAGE_BYTES,
            alt_prefix: "image".to_string(),
        }
    }
}

/// Autosave configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Enable autosave
    pub enabled: bool,

    /// Debounce delay in milliseconds
    pub delay_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
        }
    }
}

/// Outline panel and viewport tracking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Fraction of the viewport height cut from the top of the observation band
    pub band_top: f32,

    /// Fraction of the viewport height cut from the bottom of the observation band
    pub band_bottom: f32,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            band_top: 0.2,
            band_bottom: 0.8,
        }
    }
}
