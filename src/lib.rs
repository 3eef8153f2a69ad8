//! BatchResize - Parallel Batch Image Resizer
//!
//! Resizes a single image, or every image with a given extension in a
//! directory tree, and writes the results under an output directory that
//! mirrors the input layout. Work is spread over a bounded pool of worker
//! threads; a failing image is reported without stopping the rest.
//!
//! # Resize strategies
//!
//! - **width and height**: shrink to fit inside the box, then pad to
//!   exactly `width x height` (nothing is cropped)
//! - **width only**: scale so the width matches, height follows the aspect ratio
//! - **height only**: scale so the height matches, width follows the aspect ratio
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use batchresize::{AssumeYes, BatchCoordinator, BatchOutcome, ImageResizer, InputSource,
//!                   ItemProcessor, ResizeSpec};
//! use std::path::{Path, PathBuf};
//!
//! let mode = ResizeSpec::new(Some(1024), None).mode()?;
//! let coordinator = BatchCoordinator::new(ItemProcessor::new(ImageResizer::new()), None);
//!
//! let source = InputSource::Directory {
//!     root: PathBuf::from("photos"),
//!     extension: "jpg".to_string(),
//!     recursive: true,
//! };
//! if let BatchOutcome::Completed(result) =
//!     coordinator.run(&source, Path::new("resized"), mode, &mut AssumeYes)?
//! {
//!     result.print_summary();
//! }
//! # Ok::<(), batchresize::ResizeError>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod parallel;
pub mod paths;
pub mod processing;

// Re-export commonly used types
pub use config::{Config, ResizeMode, ResizeSpec};
pub use error::{Result, ResizeError};
pub use parallel::{
    AssumeYes, BatchCoordinator, BatchOutcome, BatchPhase, BatchResult, Confirm, InputSource, Prompt,
};
pub use paths::PathResolver;
pub use processing::{FilterType, ImageResizer, ItemProcessor, WorkItem};

use tracing::debug;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where log lines are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogTarget {
    /// Interleaved with the tool's normal output
    #[default]
    Stdout,
    /// Keeps stdout free for machine-readable output
    Stderr,
}

impl LogTarget {
    /// Colour only when the destination is a terminal
    fn is_terminal(self) -> bool {
        match self {
            Self::Stdout => console::Term::stdout().is_term(),
            Self::Stderr => console::Term::stderr().is_term(),
        }
    }

    fn make_writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Calling this more than once is
/// harmless; only the first subscriber is installed.
pub fn init_logging(level: &str, json: bool, target: LogTarget) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(target.make_writer())
        .with_ansi(target.is_terminal())
        .with_target(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_ok() {
        debug!("BatchResize v{} logging initialized at '{}'", VERSION, level);
    }
}
