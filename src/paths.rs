//! Input path validation and directory discovery

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, ResizeError};

/// Validates input roots and enumerates the images beneath them
pub struct PathResolver;

impl PathResolver {
    /// Accept `path` only if it exists and is a regular file
    pub fn resolve_single<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(ResizeError::FileNotFound { path: path.to_path_buf() })
        }
    }

    /// Accept `path` only if it exists and is a directory
    pub fn resolve_directory<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        if path.is_dir() {
            Ok(path.to_path_buf())
        } else {
            Err(ResizeError::NotADirectory { path: path.to_path_buf() })
        }
    }

    /// List the files under `directory` whose name ends in `.{extension}`.
    ///
    /// The match is case-sensitive. Symlinks to regular files are included.
    /// Without `recursive` only direct children are returned. Results come back in walk order.
    pub fn enumerate<P: AsRef<Path>>(directory: P, extension: &str, recursive: bool) -> Vec<PathBuf> {
        let directory = directory.as_ref();
        let suffix = format!(".{}", extension.trim_start_matches('.'));
        let max_depth = if recursive { usize::MAX } else { 1 };

        let files: Vec<PathBuf> = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry under {:?}: {}", directory, e);
                    None
                }
            })
            // Symlinked files count; symlinked directories are not descended into
            .filter(|entry| entry.path().is_file())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(&suffix))
            })
            .map(walkdir::DirEntry::into_path)
            .collect();

        debug!(
            "Found {} '{}' files in {:?} (recursive: {})",
            files.len(),
            suffix,
            directory,
            recursive
        );

        files
    }
}
