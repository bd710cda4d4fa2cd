//! JSON run summary.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "root": "/srv/backups",
//!   "dry_run": false,
//!   "link_strategy": "unlink-then-link",
//!   "exit_code": 0,
//!   "exit_code_name": "DL000",
//!   "stats": {
//!     "files_processed": 1200,
//!     "new_content": 800,
//!     "real_hardlinks": 150,
//!     "duplicates_relinked": 240,
//!     "orphans_relinked": 10,
//!     "stat_errors": 0,
//!     "read_errors": 0,
//!     "scan_errors": 0,
//!     "verify_mismatches": 0,
//!     "link_failures": 0,
//!     "sources_lost": 0,
//!     "bytes_reclaimed": 52428800,
//!     "started_at": "2026-01-01T00:00:00Z",
//!     "duration_ms": 5400
//!   }
//! }
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::actions::LinkStrategy;
use crate::dedup::RunStats;
use crate::error::ExitCode;

/// Complete JSON summary of a run.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Absolute root that was deduplicated
    pub root: String,
    /// Whether the run was a dry run
    pub dry_run: bool,
    /// Strategy used for relinking
    pub link_strategy: LinkStrategy,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DL000")
    pub exit_code_name: String,
    /// Final counters
    pub stats: RunStats,
}

impl JsonSummary {
    /// Build a summary for a completed run.
    #[must_use]
    pub fn new(
        root: &Path,
        stats: &RunStats,
        dry_run: bool,
        link_strategy: LinkStrategy,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            root: root.to_string_lossy().into_owned(),
            dry_run,
            link_strategy,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
            stats: stats.clone(),
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the summary followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        let json = self.to_json_pretty()?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
