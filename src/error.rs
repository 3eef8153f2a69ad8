//! Error types and handling for BatchResize

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for BatchResize operations
pub type Result<T> = std::result::Result<T, ResizeError>;

/// Main error type for BatchResize operations
#[derive(Debug, Error)]
pub enum ResizeError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Neither width nor height was requested, or one of them is zero
    #[error("At least one of width or height must be specified, and both must be positive")]
    InvalidSpec,

    /// Input file is missing or is not a regular file
    #[error("File '{}' doesn't exist or isn't a file", path.display())]
    FileNotFound { path: PathBuf },

    /// Directory is missing or is not a directory
    #[error("Directory '{}' doesn't exist or isn't a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// Source image could not be opened or decoded
    #[error("Failed to decode {}: {source}", path.display())]
    DecodeError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Resize, directory creation or save failed for one image
    #[error("Failed to process {}: {message}", path.display())]
    ProcessingError { path: PathBuf, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerdeError(String),
}

impl ResizeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new decode error for `path`
    pub fn decode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::DecodeError {
            path: path.into(),
            source,
        }
    }

    /// Create a new per-item processing error
    pub fn processing<S: ToString>(path: impl Into<PathBuf>, cause: S) -> Self {
        Self::ProcessingError {
            path: path.into(),
            message: cause.to_string(),
        }
    }

    /// Check if this error is recoverable (the rest of the batch can continue)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Scoped to a single work item
            Self::DecodeError { .. } | Self::ProcessingError { .. } => true,

            // Raised before dispatch, these abort the run
            Self::IoError(_)
            | Self::ConfigError { .. }
            | Self::InvalidSpec
            | Self::FileNotFound { .. }
            | Self::NotADirectory { .. }
            | Self::SerdeError(_) => false,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::FileNotFound { path }
            | Self::NotADirectory { path }
            | Self::DecodeError { path, .. }
            | Self::ProcessingError { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Describe the underlying cause without repeating the path
    pub fn cause(&self) -> String {
        match self {
            Self::DecodeError { source, .. } => format!("decode failed: {}", source),
            Self::ProcessingError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// Convert serde errors to our error type
impl From<toml::de::Error> for ResizeError {
    fn from(err: toml::de::Error) -> Self {
        Self::SerdeError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for ResizeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerdeError(format!("YAML parsing error: {}", err))
    }
}

/// Error context extension for attaching the source image path
pub trait ErrorContext<T> {
    /// Convert any error into a per-item processing error for `file`
    fn with_file_context(self, file: &Path) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn with_file_context(self, file: &Path) -> Result<T> {
        self.map_err(|e| ResizeError::processing(file, e))
    }
}
