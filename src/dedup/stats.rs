//! Run statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Classification, SkipReason};

/// Counters accumulated over one run.
///
/// Counters only ever increase; a fresh set is created with each
/// [`Deduplicator`](super::Deduplicator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Paths handed to the classifier (enumeration errors excluded)
    pub files_processed: u64,
    /// Paths that introduced new content
    pub new_content: u64,
    /// Paths already pointing at a canonical inode
    pub real_hardlinks: u64,
    /// Duplicates replaced with a hardlink
    pub duplicates_relinked: u64,
    /// Orphaned hardlinks replaced with a hardlink
    pub orphans_relinked: u64,
    /// Paths skipped because they could not be stat'ed
    pub stat_errors: u64,
    /// Paths skipped because they could not be read
    pub read_errors: u64,
    /// Entries the walker could not enumerate
    pub scan_errors: u64,
    /// Digest matches rejected by byte verification
    pub verify_mismatches: u64,
    /// Failed hardlink replacements, including `sources_lost`
    pub link_failures: u64,
    /// Link failures that left the source path missing
    pub sources_lost: u64,
    /// Bytes freed by dropping the last link of a duplicate inode
    pub bytes_reclaimed: u64,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration, filled in when the run completes
    pub duration_ms: u64,
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStats {
    /// Zeroed counters stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files_processed: 0,
            new_content: 0,
            real_hardlinks: 0,
            duplicates_relinked: 0,
            orphans_relinked: 0,
            stat_errors: 0,
            read_errors: 0,
            scan_errors: 0,
            verify_mismatches: 0,
            link_failures: 0,
            sources_lost: 0,
            bytes_reclaimed: 0,
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    /// Count one classification.
    pub fn record(&mut self, classification: &Classification) {
        match classification {
            Classification::NewContent => self.new_content += 1,
            Classification::RealHardlink => self.real_hardlinks += 1,
            Classification::Duplicate { reclaimed, .. } => {
                self.duplicates_relinked += 1;
                self.bytes_reclaimed += reclaimed;
            }
            Classification::OrphanedHardlink { reclaimed, .. } => {
                self.orphans_relinked += 1;
                self.bytes_reclaimed += reclaimed;
            }
            Classification::VerifyMismatch => self.verify_mismatches += 1,
            Classification::LinkFailed { data_loss } => {
                self.link_failures += 1;
                if *data_loss {
                    self.sources_lost += 1;
                }
            }
            Classification::Skipped(SkipReason::Stat) => self.stat_errors += 1,
            Classification::Skipped(SkipReason::Read) => self.read_errors += 1,
        }
    }

    /// Paths replaced with a hardlink.
    #[must_use]
    pub fn relinked(&self) -> u64 {
        self.duplicates_relinked + self.orphans_relinked
    }

    /// Paths and entries left alone because of an error.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.stat_errors
            + self.read_errors
            + self.scan_errors
            + self.verify_mismatches
            + self.link_failures
    }

    /// One-line summary of the running counters.
    #[must_use]
    pub fn progress_line(&self) -> String {
        format!(
            "Processed {} files: {} duplicates, {} hardlinks, {} orphaned hardlinks so far",
            self.files_processed,
            self.duplicates_relinked,
            self.real_hardlinks,
            self.orphans_relinked
        )
    }
}
