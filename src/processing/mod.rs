//! Core image processing functionality

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{ResizeMode, DEFAULT_QUALITY};
use crate::error::{ErrorContext, Result, ResizeError};

pub mod formats;
pub mod resize;

pub use formats::*;
pub use resize::*;

/// One image to resize, moved by value into a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub source_path: PathBuf,
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub mode: ResizeMode,
}

impl WorkItem {
    pub fn new(
        source_path: impl Into<PathBuf>,
        source_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        mode: ResizeMode,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            source_root: source_root.into(),
            output_root: output_root.into(),
            mode,
        }
    }

    /// Re-root the source path under the output directory, mirroring any
    /// subdirectories between `source_root` and the file.
    pub fn output_path(&self) -> Result<PathBuf> {
        let relative = self.source_path.strip_prefix(&self.source_root).map_err(|_| {
            ResizeError::processing(
                &self.source_path,
                format!("not located under {}", self.source_root.display()),
            )
        })?;

        if relative.as_os_str().is_empty() {
            return Err(ResizeError::processing(&self.source_path, "source is its own root"));
        }

        Ok(self.output_root.join(relative))
    }
}

/// Resizes a single image end to end: open, resize, mirror path, save
#[derive(Debug, Clone)]
pub struct ItemProcessor {
    resizer: ImageResizer,
    quality: u8,
}

impl ItemProcessor {
    /// Create a new processor
    pub fn new(resizer: ImageResizer) -> Self {
        Self {
            resizer,
            quality: DEFAULT_QUALITY,
        }
    }

    /// Set JPEG output quality (1-100)
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Process one work item, returning the path that was written.
    ///
    /// Decode failures leave the output tree untouched.
    pub fn process(&self, item: &WorkItem) -> Result<PathBuf> {
        let source = item.source_path.as_path();

        debug!("Opening {:?}", source);
        let (image, format) = open_image(source)?;
        debug!(
            "Decoded {:?}: {}x{} {}",
            source,
            image.width(),
            image.height(),
            format_name(format)
        );

        let resized = self.resizer.resize(&image, item.mode).map_err(|e| match e {
            ResizeError::ProcessingError { .. } => e,
            other => ResizeError::processing(source, other),
        })?;
        drop(image);

        let output_path = item.output_path()?;
        ensure_parent_dir(&output_path).with_file_context(source)?;

        debug!(
            "Saving {:?} ({}x{}) to {:?}",
            source,
            resized.width(),
            resized.height(),
            output_path
        );
        save_image(&resized, &output_path, format, self.quality)
            .map_err(|e| ResizeError::processing(source, format!("saving {}: {}", output_path.display(), e)))?;

        Ok(output_path)
    }
}

impl Default for ItemProcessor {
    fn default() -> Self {
        Self::new(ImageResizer::new())
    }
}

/// Create any missing parent directories of `path`
fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
