//! User configuration loaded from a JSON file.

use crate::color::BrushColor;
use crate::settings::{BrushSettings, DEFAULT_BRUSH_OPACITY, DEFAULT_BRUSH_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Start-up configuration. Every field has a default, so a partial file is
/// valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrushConfig {
    pub color: BrushColor,
    pub size: f64,
    pub opacity: f64,
    pub mirrored: bool,
    pub background: BrushColor,
    /// Fixed seed for reproducible stamping. Random when absent.
    pub seed: Option<u64>,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            color: BrushColor::WHITE,
            size: DEFAULT_BRUSH_SIZE,
            opacity: DEFAULT_BRUSH_OPACITY,
            mirrored: true,
            background: BrushColor::BACKGROUND,
            seed: None,
        }
    }
}

impl BrushConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Default config file location.
    ///
    /// On Unix: `~/.config/alchemy-brush/config.json`
    /// On Windows: `%APPDATA%\alchemy-brush\config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("alchemy-brush").join("config.json"))
    }

    /// Load from the default location, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Initial brush settings (size and opacity clamped).
    pub fn brush_settings(&self) -> BrushSettings {
        BrushSettings::new(self.color, self.size, self.opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BrushConfig::from_json(r##"{"color":"#00ff00","mirrored":false}"##).unwrap();
        assert_eq!(config.color, BrushColor::new(0, 255, 0));
        assert!(!config.mirrored);
        assert_eq!(config.background, BrushColor::BACKGROUND);
        assert!((config.size - DEFAULT_BRUSH_SIZE).abs() < f64::EPSILON);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_invalid_color_is_parse_error() {
        let result = BrushConfig::from_json(r#"{"color":"purple"}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let config = BrushConfig {
            size: 120.0,
            seed: Some(7),
            ..BrushConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = BrushConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = BrushConfig::load(&temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_brush_settings_are_clamped() {
        let config = BrushConfig {
            size: 9000.0,
            opacity: 2.0,
            ..BrushConfig::default()
        };
        let settings = config.brush_settings();
        assert!((settings.size - 300.0).abs() < f64::EPSILON);
        assert!((settings.opacity - 1.0).abs() < f64::EPSILON);
    }
}
