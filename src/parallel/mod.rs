//! Batch coordination: enumerate, confirm, dispatch, aggregate

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use console::style;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::config::ResizeMode;
use crate::error::{Result, ResizeError};
use crate::paths::PathResolver;
use crate::processing::{ItemProcessor, WorkItem};

pub mod confirm;
pub mod progress;

pub use confirm::*;
pub use progress::*;

/// Where the batch's images come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// One image; its parent directory is the mirroring root
    File(PathBuf),
    /// Every matching image under a directory
    Directory {
        root: PathBuf,
        extension: String,
        recursive: bool,
    },
}

/// Lifecycle of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    Enumerating,
    AwaitingConfirmation,
    Canceled,
    Dispatching,
    Aggregating,
    Done,
}

/// How a batch run ended
#[derive(Debug)]
pub enum BatchOutcome {
    /// Discovery found no matching files; nothing was asked or written
    NothingToDo,
    /// The confirmation prompt was declined
    Canceled,
    /// Every item was dispatched and reported back
    Completed(BatchResult),
}

/// Drives a batch through discovery, confirmation and a bounded worker pool
pub struct BatchCoordinator {
    processor: Arc<ItemProcessor>,
    workers: usize,
    quiet: bool,
    phase: Mutex<BatchPhase>,
}

impl BatchCoordinator {
    /// Create a coordinator. `workers` defaults to the logical core count.
    pub fn new(processor: ItemProcessor, workers: Option<usize>) -> Self {
        let workers = workers.filter(|&n| n > 0).unwrap_or_else(num_cpus::get);

        debug!("Initializing batch coordinator with {} workers", workers);

        Self {
            processor: Arc::new(processor),
            workers,
            quiet: false,
            phase: Mutex::new(BatchPhase::Idle),
        }
    }

    /// Suppress the progress bar; counting is unaffected
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> BatchPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, phase: BatchPhase) {
        debug!("Batch phase: {:?}", phase);
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    /// Build the work list for `source`, validating both roots.
    pub fn enumerate(&self, source: &InputSource, output_root: &Path, mode: ResizeMode) -> Result<Vec<WorkItem>> {
        self.enter(BatchPhase::Enumerating);
        let output_root = PathResolver::resolve_directory(output_root)?;

        let items = match source {
            InputSource::File(path) => {
                let file = PathResolver::resolve_single(path)?;
                let root = file.parent().map(Path::to_path_buf).unwrap_or_default();
                vec![WorkItem::new(file, root, output_root, mode)]
            }
            InputSource::Directory { root, extension, recursive } => {
                let root = PathResolver::resolve_directory(root)?;
                PathResolver::enumerate(&root, extension, *recursive)
                    .into_iter()
                    .map(|path| WorkItem::new(path, &root, &output_root, mode))
                    .collect()
            }
        };

        Ok(items)
    }

    /// Run a whole batch. Directory batches ask `confirm` before any work
    /// starts; single files go straight to dispatch.
    pub fn run<C: Confirm + ?Sized>(
        &self,
        source: &InputSource,
        output_root: &Path,
        mode: ResizeMode,
        confirm: &mut C,
    ) -> Result<BatchOutcome> {
        let items = self.enumerate(source, output_root, mode)?;

        if let InputSource::Directory { .. } = source {
            if items.is_empty() {
                self.enter(BatchPhase::Done);
                return Ok(BatchOutcome::NothingToDo);
            }

            self.enter(BatchPhase::AwaitingConfirmation);
            if !confirm.confirm(items.len())? {
                self.enter(BatchPhase::Canceled);
                info!("Batch of {} images canceled", items.len());
                return Ok(BatchOutcome::Canceled);
            }
        }

        self.dispatch(items).map(BatchOutcome::Completed)
    }

    /// Resize every item on the worker pool and aggregate the outcomes.
    ///
    /// Each job reports exactly once; a failing or panicking item is
    /// recorded and never stops its siblings.
    pub fn dispatch(&self, items: Vec<WorkItem>) -> Result<BatchResult> {
        let start_time = Instant::now();
        let total = items.len();
        let mut result = BatchResult::new(total);

        if total == 0 {
            self.enter(BatchPhase::Done);
            return Ok(result);
        }

        self.enter(BatchPhase::Dispatching);
        info!("Dispatching {} images to {} workers", total, self.workers);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("resize-worker-{}", index))
            .build()
            .map_err(|e| ResizeError::config(format!("Failed to start worker pool: {}", e)))?;

        let progress = ProgressReporter::new(total, self.quiet);
        let (sender, receiver) = crossbeam::channel::unbounded::<ItemOutcome>();

        for item in items {
            let processor = Arc::clone(&self.processor);
            let sender = sender.clone();
            pool.spawn(move || {
                let outcome = process_isolated(&processor, item);
                // The receiver lives until every sender is gone
                let _ = sender.send(outcome);
            });
        }
        drop(sender);

        self.enter(BatchPhase::Aggregating);
        for outcome in receiver.iter() {
            let state = progress.record_completion();
            match &outcome.result {
                Ok(_) => debug!(
                    "Finished {:?} ({}/{}, {:.0}%)",
                    outcome.source_path,
                    state.completed,
                    state.total,
                    state.percentage()
                ),
                Err(error) => progress.suspend(|| warn!("{}", error)),
            }
            result.record(outcome);
        }

        let state = progress.state();
        if !state.is_complete() {
            warn!("Only {} of {} items reported back", state.completed, state.total);
        }

        result.elapsed = start_time.elapsed();
        self.enter(BatchPhase::Done);

        info!(
            "Batch completed in {:.2}s: {} succeeded, {} failed",
            result.elapsed.as_secs_f64(),
            result.succeeded,
            result.failed.len()
        );

        Ok(result)
    }
}

/// What one worker reports back for its item
#[derive(Debug)]
pub struct ItemOutcome {
    pub source_path: PathBuf,
    pub result: Result<PathBuf>,
}

fn process_isolated(processor: &ItemProcessor, item: WorkItem) -> ItemOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| processor.process(&item)))
        .unwrap_or_else(|payload| {
            Err(ResizeError::processing(
                &item.source_path,
                format!("worker panicked: {}", panic_message(payload.as_ref())),
            ))
        });

    ItemOutcome {
        source_path: item.source_path,
        result,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// One image that could not be resized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub path: PathBuf,
    pub error: String,
}

/// Aggregate outcome of a dispatched batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedItem>,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl BatchResult {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Fold one worker outcome into the totals
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome.result {
            Ok(_) => self.succeeded += 1,
            Err(error) => self.failed.push(FailedItem {
                path: outcome.source_path,
                error: error.cause(),
            }),
        }
    }

    /// True when no item failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.is_zero() {
            return 0.0;
        }
        self.succeeded as f64 / self.elapsed.as_secs_f64()
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("{}", style("Processing Summary:").bold());
        println!("  {}: {}/{}", style("Processed").green(), self.succeeded, self.total);
        if !self.failed.is_empty() {
            println!("  {}: {}", style("Failed").red(), self.failed.len());
        }
        println!("Took {:.2} sec.", self.elapsed.as_secs_f64());

        if self.succeeded > 0 {
            println!("  {}: {:.1} files/sec", style("Speed").cyan(), self.files_per_second());
        }

        if !self.failed.is_empty() {
            println!();
            println!("{}", style("Errors:").red().bold());
            for (i, failure) in self.failed.iter().enumerate() {
                println!("  {}: {}: {}", i + 1, failure.path.display(), failure.error);
            }
        }
    }
}
