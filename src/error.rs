//! Error types for the canvas core.

use std::io;
use thiserror::Error;

/// Errors surfaced by an editing session.
#[derive(Error, Debug)]
pub enum CanvasError {
    /// The base image could not be decoded. The session is left blank.
    #[error("Failed to decode base image: {0}")]
    Decode(#[source] image::ImageError),

    /// A `data:` URL was malformed or its payload was not valid base64.
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Encoding the surface failed.
    #[error("Failed to encode surface: {0}")]
    Encode(#[source] image::ImageError),

    /// I/O error while writing an export.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The editor configuration was rejected.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to editor configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A value is outside its valid range.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    /// A colour string could not be parsed.
    #[error("Invalid colour '{0}'")]
    InvalidColor(String),

    /// TOML deserialization failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
