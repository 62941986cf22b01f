//! Editor configuration.
//!
//! Every field has a default matching the storefront's design dialog, so an
//! empty TOML document (or `EditorConfig::default()`) yields a 750×1590 white
//! print surface, 50 undo steps and a 20%–300% zoom range.

use std::path::Path;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::components::colors::parse_hex_color;
use crate::error::ConfigError;

/// Print-resolution phone-case area.
pub const DEFAULT_WIDTH: u32 = 750;
pub const DEFAULT_HEIGHT: u32 = 1590;

/// Largest accepted surface edge.
const MAX_SURFACE_DIM: u32 = 16_384;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub width: u32,
    pub height: u32,
    /// Background fill, as a hex colour.
    pub background: String,
    /// On-screen size of the surface at zoom 1.0, in view units.
    pub display_width: f32,
    pub display_height: f32,
    /// Maximum number of history entries kept, including the initial one.
    pub max_history: usize,
    /// Optional byte budget across all history entries.
    pub max_history_bytes: Option<usize>,
    pub zoom: ZoomConfig,
    pub brush: BrushConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub step: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub default_size: f32,
    pub min_size: f32,
    pub max_size: f32,
    pub default_color: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: "#FFFFFF".to_string(),
            display_width: 500.0,
            display_height: 1060.0,
            max_history: 50,
            max_history_bytes: Some(200 * 1024 * 1024),
            zoom: ZoomConfig::default(),
            brush: BrushConfig::default(),
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.2,
            max: 3.0,
            default: 0.5,
            step: 0.25,
        }
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            default_size: 5.0,
            min_size: 1.0,
            max_size: 50.0,
            default_color: "#000000".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key, reason: &str| ConfigError::InvalidSetting {
            key,
            reason: reason.to_string(),
        };

        if self.width == 0 || self.width > MAX_SURFACE_DIM {
            return Err(invalid("width", "must be between 1 and 16384"));
        }
        if self.height == 0 || self.height > MAX_SURFACE_DIM {
            return Err(invalid("height", "must be between 1 and 16384"));
        }
        if !(self.display_width > 0.0 && self.display_height > 0.0) {
            return Err(invalid("display_width", "display size must be positive"));
        }
        if self.max_history == 0 {
            return Err(invalid("max_history", "must keep at least one entry"));
        }
        let z = &self.zoom;
        if !(z.min > 0.0 && z.min <= z.max) {
            return Err(invalid("zoom.min", "must be positive and not above zoom.max"));
        }
        if !(z.min..=z.max).contains(&z.default) {
            return Err(invalid("zoom.default", "must lie within [zoom.min, zoom.max]"));
        }
        if !(z.step > 0.0) {
            return Err(invalid("zoom.step", "must be positive"));
        }
        let b = &self.brush;
        if !(b.min_size > 0.0 && b.min_size <= b.max_size) {
            return Err(invalid("brush.min_size", "must be positive and not above brush.max_size"));
        }
        self.background_color()?;
        parse_hex_color(&b.default_color)?;
        Ok(())
    }

    pub fn background_color(&self) -> Result<Rgba<u8>, ConfigError> {
        parse_hex_color(&self.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.width, 750);
        assert_eq!(config.height, 1590);
        assert_eq!(config.zoom.default, 0.5);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = EditorConfig::from_toml_str(
            r##"
            width = 200
            height = 400
            background = "#000000"

            [zoom]
            max = 2.0
            "##,
        )
        .unwrap();
        assert_eq!(config.width, 200);
        assert_eq!(config.zoom.max, 2.0);
        assert_eq!(config.zoom.min, 0.2);
        assert_eq!(config.brush.max_size, 50.0);
        assert_eq!(config.background_color().unwrap(), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            EditorConfig::from_toml_str("width = 0"),
            Err(ConfigError::InvalidSetting { key: "width", .. })
        ));
        assert!(matches!(
            EditorConfig::from_toml_str("[zoom]\nmin = 2.0\nmax = 1.0"),
            Err(ConfigError::InvalidSetting { key: "zoom.min", .. })
        ));
        assert!(matches!(
            EditorConfig::from_toml_str("max_history = 0"),
            Err(ConfigError::InvalidSetting { key: "max_history", .. })
        ));
        assert!(matches!(
            EditorConfig::from_toml_str("background = \"white\""),
            Err(ConfigError::InvalidColor(_))
        ));
        assert!(matches!(
            EditorConfig::from_toml_str("width = \"wide\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_history = 10").unwrap();
        let config = EditorConfig::load(file.path()).unwrap();
        assert_eq!(config.max_history, 10);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = EditorConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
