//! Progress reporting for batch dispatch

use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

/// Bar width used when the terminal size is unknown
pub const FALLBACK_BAR_WIDTH: usize = 40;

const MIN_BAR_WIDTH: usize = 10;

// Columns taken by "{pos}/{len} ({percent}%) [" and "] {elapsed_precise}"
// for a batch of up to five-digit size.
const RESERVED_COLUMNS: usize = 36;

/// Snapshot of how far a batch has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub completed: usize,
    pub total: usize,
}

impl ProgressState {
    /// Completion percentage, 100 for an empty batch
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed as f64 / self.total as f64) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Thread-safe single-line progress display.
///
/// The completed counter is atomic so completions may be recorded from any
/// thread; rendering goes through indicatif, which serializes draws.
pub struct ProgressReporter {
    bar: ProgressBar,
    completed: AtomicUsize,
    total: usize,
}

impl ProgressReporter {
    /// Create a reporter for `total` items. A `quiet` reporter still counts
    /// but never draws.
    pub fn new(total: usize, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let width = bar_width(terminal_columns());
            let template = format!(
                "{{pos}}/{{len}} ({{percent}}%) [{{bar:{}.cyan/blue}}] {{elapsed_precise}}",
                width
            );
            let style = ProgressStyle::with_template(&template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            let bar = ProgressBar::new(total as u64);
            bar.set_style(style);
            bar
        };
        bar.set_length(total as u64);

        Self {
            bar,
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Count one finished item and redraw
    pub fn record_completion(&self) -> ProgressState {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let state = ProgressState {
            completed: completed.min(self.total),
            total: self.total,
        };
        self.report(state.completed, state.total);
        state
    }

    /// Render an explicit `completed / total` state, terminating the line
    /// once everything is done.
    pub fn report(&self, completed: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(completed as u64);
        if (ProgressState { completed, total }).is_complete() && !self.bar.is_finished() {
            self.bar.finish();
        }
    }

    /// Current counter values
    pub fn state(&self) -> ProgressState {
        ProgressState {
            completed: self.completed.load(Ordering::SeqCst).min(self.total),
            total: self.total,
        }
    }

    /// Run `f` with the bar hidden, for log lines printed mid-batch
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }
}

fn terminal_columns() -> Option<u16> {
    console::Term::stdout().size_checked().map(|(_rows, columns)| columns)
}

/// Width of the bar itself given the terminal's column count
pub fn bar_width(columns: Option<u16>) -> usize {
    match columns {
        Some(columns) => usize::from(columns)
            .saturating_sub(RESERVED_COLUMNS)
            .max(MIN_BAR_WIDTH),
        None => FALLBACK_BAR_WIDTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_bar_width() {
        assert_eq!(bar_width(None), FALLBACK_BAR_WIDTH);
        assert_eq!(bar_width(Some(120)), 120 - RESERVED_COLUMNS);
        assert_eq!(bar_width(Some(20)), MIN_BAR_WIDTH);
    }

    #[test]
    fn test_progress_state_percentage() {
        let state = ProgressState { completed: 1, total: 4 };
        assert_eq!(state.percentage(), 25.0);
        assert!(!state.is_complete());

        let empty = ProgressState { completed: 0, total: 0 };
        assert_eq!(empty.percentage(), 100.0);
        assert!(empty.is_complete());
    }

    #[test]
    fn test_quiet_reporter_still_counts() {
        let reporter = ProgressReporter::new(3, true);
        assert!(reporter.bar.is_hidden());

        reporter.record_completion();
        let state = reporter.record_completion();
        assert_eq!(state, ProgressState { completed: 2, total: 3 });

        assert!(!reporter.bar.is_finished());
        let state = reporter.record_completion();
        assert!(state.is_complete());
        assert!(reporter.bar.is_finished());
    }

    #[test]
    fn test_concurrent_completions_are_not_lost() {
        let total = 8 * 250;
        let reporter = Arc::new(ProgressReporter::new(total, true));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reporter = Arc::clone(&reporter);
                thread::spawn(move || {
                    for _ in 0..250 {
                        reporter.record_completion();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(reporter.state(), ProgressState { completed: total, total });
    }
}
