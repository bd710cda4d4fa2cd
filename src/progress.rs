//! Progress reporting.
//!
//! The deduplicator reports through [`ProgressCallback`]. Two reporters are
//! provided:
//!
//! - [`LogProgress`]: an info-level log line every reporting interval (the
//!   default)
//! - [`Progress`]: an indicatif spinner for interactive terminals

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::dedup::RunStats;

/// Progress callback for a deduplication run.
pub trait ProgressCallback: Send + Sync {
    /// Called before each path is classified.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of the path being processed (1-based)
    /// * `path` - Path being processed
    fn on_file(&self, _current: u64, _path: &Path) {}

    /// Called every reporting interval with the running counters.
    fn on_progress(&self, stats: &RunStats);

    /// Called once when the run completes.
    fn on_finish(&self, _stats: &RunStats) {}
}

/// Reports progress as info-level log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressCallback for LogProgress {
    fn on_progress(&self, stats: &RunStats) {
        log::info!("{}", stats.progress_line());
    }
}

/// Spinner-based progress reporter using indicatif.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// Create a spinner drawing to stderr.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupelink::progress::Progress;
    ///
    /// let progress = Progress::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Create a spinner that never draws (for tests).
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Current position of the spinner.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for Progress {
    fn on_file(&self, current: u64, path: &Path) {
        self.bar.set_position(current);
        self.bar.set_message(truncate_path(path, 40));
    }

    fn on_progress(&self, stats: &RunStats) {
        self.bar.set_message(format!(
            "({} dup, {} hardlinks, {} orphans)",
            stats.duplicates_relinked, stats.real_hardlinks, stats.orphans_relinked
        ));
    }

    fn on_finish(&self, stats: &RunStats) {
        self.bar.set_position(stats.files_processed);
        self.bar.finish_and_clear();
    }
}

/// Truncate a path for display next to the spinner.
fn truncate_path(path: &Path, max_len: usize) -> String {
    let display = path.to_string_lossy();
    if display.chars().count() <= max_len {
        return display.into_owned();
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name_len = file_name.chars().count();

    if name_len + 4 > max_len {
        let tail: String = file_name
            .chars()
            .skip(name_len.saturating_sub(max_len.saturating_sub(3)))
            .collect();
        return format!("...{}", tail);
    }

    format!(".../{}", file_name)
}
