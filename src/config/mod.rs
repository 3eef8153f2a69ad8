//! Configuration management for BatchResize

use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ResizeError};
use crate::processing::resize::FilterType;

/// Extension used for directory discovery when none is configured
pub const DEFAULT_EXTENSION: &str = "jpg";

/// JPEG quality used when none is configured
pub const DEFAULT_QUALITY: u8 = 90;

/// Main configuration structure, loaded from an optional TOML/YAML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global processing settings
    pub processing: ProcessingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Global processing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of worker threads (None = logical core count)
    pub threads: Option<usize>,

    /// Extension filter for directory mode
    pub extension: String,

    /// Resampling filter
    pub filter: FilterType,

    /// JPEG output quality (1-100)
    pub quality: u8,

    /// Canvas colour for contain mode
    pub fill_color: [u8; 3],
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            threads: None,
            extension: DEFAULT_EXTENSION.to_string(),
            filter: FilterType::default(),
            quality: DEFAULT_QUALITY,
            fill_color: [255, 255, 255],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
        }
    }
}

/// Requested output dimensions, as given on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeSpec {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResizeSpec {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self { width, height }
    }

    /// Decide the resize strategy for the whole batch.
    ///
    /// Fails with [`ResizeError::InvalidSpec`] when neither dimension is
    /// set or a dimension is zero.
    pub fn mode(&self) -> Result<ResizeMode> {
        match (self.width, self.height) {
            (Some(0), _) | (_, Some(0)) | (None, None) => Err(ResizeError::InvalidSpec),
            (Some(width), Some(height)) => Ok(ResizeMode::Contain { width, height }),
            (Some(width), None) => Ok(ResizeMode::ScaleByWidth { width }),
            (None, Some(height)) => Ok(ResizeMode::ScaleByHeight { height }),
        }
    }
}

/// Resize strategy, decided once per batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResizeMode {
    /// Shrink to fit inside the box, then pad to exactly `width x height`
    Contain { width: u32, height: u32 },

    /// Resize to specific width, maintain aspect ratio
    ScaleByWidth { width: u32 },

    /// Resize to specific height, maintain aspect ratio
    ScaleByHeight { height: u32 },
}

impl std::fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contain { width, height } => write!(f, "contain {}x{}", width, height),
            Self::ScaleByWidth { width } => write!(f, "width {}", width),
            Self::ScaleByHeight { height } => write!(f, "height {}", height),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ResizeError::config(
                format!("Failed to read config file {:?}: {}", path.as_ref(), e)
            ))?;

        let extension = path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let config: Config = match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            _ => return Err(ResizeError::config(
                "Unsupported config file format. Use .toml or .yaml"
            )),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(threads) = self.processing.threads {
            if threads == 0 {
                return Err(ResizeError::config(
                    "Thread count must be greater than 0"
                ));
            }
        }

        if !(1..=100).contains(&self.processing.quality) {
            return Err(ResizeError::config(
                "Quality must be between 1 and 100"
            ));
        }

        if self.processing.extension.trim_start_matches('.').is_empty() {
            return Err(ResizeError::config("Extension must not be empty"));
        }

        Ok(())
    }
}
