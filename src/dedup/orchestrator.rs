//! Per-file classification and relinking.
//!
//! # Overview
//!
//! [`Deduplicator`] consumes paths one at a time, in enumeration order:
//!
//! 1. **Resolve** the path's `(device, inode)` identity.
//! 2. **Known inode**: a canonical inode makes the path a *real hardlink*
//!    (nothing to do); a superseded inode makes it an *orphaned hardlink*,
//!    relinked straight to the canonical path without hashing.
//! 3. **Unknown inode**: hash the content. A known digest makes the path a
//!    *duplicate* (relinked, inode marked superseded); an unknown digest makes
//!    it *new content* (inode becomes canonical).
//!
//! Every inode is hashed at most once per run. One path is fully classified
//! and relinked before the next is looked at; the maps are only mutated in
//! step with the filesystem.
//!
//! # Example
//!
//! ```no_run
//! use dupelink::dedup::{DedupConfig, Deduplicator};
//! use dupelink::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/srv/backups"), WalkerConfig::default());
//! let mut dedup = Deduplicator::new(DedupConfig::default().with_dry_run(true));
//! let stats = dedup.run(walker.walk());
//! println!("{} duplicates", stats.duplicates_relinked);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::actions::link::{FileSystem, LinkManager, LinkReplaceError, LinkStrategy, StdFileSystem};
use crate::actions::verify::files_identical;
use crate::progress::{LogProgress, ProgressCallback};
use crate::scanner::hasher::{Hasher, DEFAULT_BUFFER_SIZE};
use crate::scanner::inode::{self, FileObservation};
use crate::scanner::{hash_to_hex, InodeKey, ScanError};

use super::index::{DuplicateIndex, InodeClass, InodeClassMap};
use super::stats::RunStats;

/// Default number of files between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

/// Why a path was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The path could not be stat'ed.
    Stat,
    /// The content could not be read.
    Read,
}

/// Outcome of classifying one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// First path seen with this content; its inode became canonical.
    NewContent,
    /// The path already points at a canonical inode.
    RealHardlink,
    /// New inode with known content, relinked to `canonical`.
    Duplicate {
        /// Path the duplicate now links to
        canonical: PathBuf,
        /// Bytes freed by the relink
        reclaimed: u64,
    },
    /// Path on a superseded inode, relinked to `canonical` without hashing.
    OrphanedHardlink {
        /// Path the orphan now links to
        canonical: PathBuf,
        /// Bytes freed by the relink
        reclaimed: u64,
    },
    /// Digest matched but the bytes differ; nothing was changed.
    VerifyMismatch,
    /// Replacing the path with a hardlink failed.
    LinkFailed {
        /// The source path was removed and could not be restored.
        data_loss: bool,
    },
    /// The path could not be inspected.
    Skipped(SkipReason),
}

/// Configuration for a deduplication run.
#[derive(Clone)]
pub struct DedupConfig {
    /// How duplicates are swapped for hardlinks.
    pub strategy: LinkStrategy,
    /// Classify and count without touching the filesystem.
    pub dry_run: bool,
    /// Byte-compare each digest match before relinking.
    pub verify: bool,
    /// Files between progress reports (0 disables reporting).
    pub progress_interval: u64,
    /// Read buffer size for hashing and verification.
    pub hash_buffer_size: usize,
    /// Progress reporter; defaults to [`LogProgress`].
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DedupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupConfig")
            .field("strategy", &self.strategy)
            .field("dry_run", &self.dry_run)
            .field("verify", &self.verify)
            .field("progress_interval", &self.progress_interval)
            .field("hash_buffer_size", &self.hash_buffer_size)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            strategy: LinkStrategy::default(),
            dry_run: false,
            verify: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            hash_buffer_size: DEFAULT_BUFFER_SIZE,
            progress_callback: None,
        }
    }
}

impl DedupConfig {
    /// Set the link strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: LinkStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable or disable byte verification.
    #[must_use]
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Set the progress reporting interval.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Set the hashing buffer size.
    #[must_use]
    pub fn with_hash_buffer_size(mut self, size: usize) -> Self {
        self.hash_buffer_size = size;
        self
    }

    /// Set the progress reporter.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// All mutable state of one run.
#[derive(Debug, Default)]
pub struct DedupContext {
    /// Content digest → canonical inode.
    pub index: DuplicateIndex,
    /// Inode → canonical inode and last-known path.
    pub classes: InodeClassMap,
    /// Running counters.
    pub stats: RunStats,
}

/// Drives the classification state machine over a stream of paths.
pub struct Deduplicator<F: FileSystem = StdFileSystem> {
    config: DedupConfig,
    hasher: Hasher,
    linker: LinkManager<F>,
    progress: Arc<dyn ProgressCallback>,
    context: DedupContext,
    started: Instant,
}

impl Deduplicator<StdFileSystem> {
    /// Create a deduplicator operating on the real filesystem.
    #[must_use]
    pub fn new(config: DedupConfig) -> Self {
        Self::with_filesystem(config, StdFileSystem)
    }
}

impl<F: FileSystem> Deduplicator<F> {
    /// Create a deduplicator whose relinks go through `fs`.
    #[must_use]
    pub fn with_filesystem(config: DedupConfig, fs: F) -> Self {
        let hasher = Hasher::new().with_buffer_size(config.hash_buffer_size);
        let linker = LinkManager::with_filesystem(fs, config.strategy, config.dry_run);
        let progress = config
            .progress_callback
            .clone()
            .unwrap_or_else(|| Arc::new(LogProgress));
        Self {
            config,
            hasher,
            linker,
            progress,
            context: DedupContext::default(),
            started: Instant::now(),
        }
    }

    /// Read-only view of the run state.
    #[must_use]
    pub fn context(&self) -> &DedupContext {
        &self.context
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &RunStats {
        &self.context.stats
    }

    /// Classify every enumerated path and return the final counters.
    ///
    /// Enumeration errors are logged and counted; they never stop the run.
    pub fn run<I>(&mut self, paths: I) -> RunStats
    where
        I: IntoIterator<Item = Result<PathBuf, ScanError>>,
    {
        for entry in paths {
            match entry {
                Ok(path) => {
                    self.process(&path);
                }
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    self.context.stats.scan_errors += 1;
                }
            }
        }
        self.finish()
    }

    /// Stamp the duration, notify the reporter and return the counters.
    pub fn finish(&mut self) -> RunStats {
        let elapsed = self.started.elapsed().as_millis();
        self.context.stats.duration_ms = u64::try_from(elapsed).unwrap_or(u64::MAX);
        self.progress.on_finish(&self.context.stats);
        self.context.stats.clone()
    }

    /// Classify one path, relinking it if needed.
    ///
    /// Every per-file failure is contained here and reported through the
    /// returned [`Classification`].
    pub fn process(&mut self, path: &Path) -> Classification {
        self.context.stats.files_processed += 1;
        let current = self.context.stats.files_processed;
        self.progress.on_file(current, path);

        let classification = self.classify(path);
        self.context.stats.record(&classification);

        let interval = self.config.progress_interval;
        if interval > 0 && current % interval == 0 {
            self.progress.on_progress(&self.context.stats);
        }
        classification
    }

    fn classify(&mut self, path: &Path) -> Classification {
        let obs = match inode::resolve(path) {
            Ok(obs) => obs,
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                return Classification::Skipped(SkipReason::Stat);
            }
        };

        match self.context.classes.classify(&obs.inode) {
            Some(InodeClass::Canonical { path: canonical_path }) => {
                log::debug!(
                    "Real hardlink: {} --> {}",
                    obs.path.display(),
                    canonical_path.display()
                );
                return Classification::RealHardlink;
            }
            Some(InodeClass::Superseded {
                canonical,
                canonical_path,
            }) => {
                let target = canonical_path.to_path_buf();
                return self.relink_orphan(&obs, canonical, target);
            }
            None => {}
        }

        let digest = match self.hasher.digest(&obs.path) {
            Ok(digest) => digest,
            Err(e) => {
                log::warn!("Skipping {}: {}", obs.path.display(), e);
                return Classification::Skipped(SkipReason::Read);
            }
        };

        match self.context.index.get(&digest) {
            Some(canonical) => self.relink_duplicate(&obs, canonical),
            None => {
                self.context.index.insert_first(digest, obs.inode);
                self.context
                    .classes
                    .insert_canonical(obs.inode, obs.path.clone());
                log::trace!(
                    "New content {}: {}",
                    hash_to_hex(&digest),
                    obs.path.display()
                );
                Classification::NewContent
            }
        }
    }

    /// Swap `obs` for a hardlink to `target`, refusing before any unlink if
    /// the two inodes are on different devices.
    fn relink(
        &mut self,
        obs: &FileObservation,
        canonical: InodeKey,
        target: &Path,
    ) -> Result<(), LinkReplaceError> {
        self.linker
            .ensure_same_device(&obs.path, obs.inode.dev, target, canonical.dev)?;
        self.linker.replace_with_hardlink(&obs.path, target)
    }

    fn relink_orphan(
        &mut self,
        obs: &FileObservation,
        canonical: InodeKey,
        target: PathBuf,
    ) -> Classification {
        if let Err(e) = self.relink(obs, canonical, &target) {
            return link_failed(&e);
        }
        log::debug!(
            "Orphaned hardlink: {} --> {}",
            obs.path.display(),
            target.display()
        );
        Classification::OrphanedHardlink {
            reclaimed: reclaimed_bytes(obs),
            canonical: target,
        }
    }

    fn relink_duplicate(&mut self, obs: &FileObservation, canonical: InodeKey) -> Classification {
        let Some(target) = self
            .context
            .classes
            .canonical_path(&canonical)
            .map(Path::to_path_buf)
        else {
            // Every indexed inode is registered canonical in the same step.
            log::error!(
                "Index points at non-canonical inode {} for {}; skipping",
                canonical,
                obs.path.display()
            );
            return Classification::Skipped(SkipReason::Stat);
        };

        if self.config.verify {
            match files_identical(&obs.path, &target, self.hasher.buffer_size()) {
                Ok(true) => {}
                Ok(false) => {
                    log::warn!(
                        "Digest collision: {} matches {} by digest but not by content; left untouched",
                        obs.path.display(),
                        target.display()
                    );
                    return Classification::VerifyMismatch;
                }
                Err(e) => {
                    log::warn!(
                        "Skipping {}: verification against {} failed: {}",
                        obs.path.display(),
                        target.display(),
                        e
                    );
                    return Classification::Skipped(SkipReason::Read);
                }
            }
        }

        if let Err(e) = self.relink(obs, canonical, &target) {
            return link_failed(&e);
        }

        if let Err(e) = self
            .context
            .classes
            .insert_superseded(obs.inode, canonical, obs.path.clone())
        {
            log::error!("Inconsistent inode map for {}: {}", obs.path.display(), e);
        }
        log::debug!(
            "Duplicate: {} --> {}",
            obs.path.display(),
            target.display()
        );
        Classification::Duplicate {
            reclaimed: reclaimed_bytes(obs),
            canonical: target,
        }
    }
}

/// Bytes freed when `obs` held the last link to its inode.
fn reclaimed_bytes(obs: &FileObservation) -> u64 {
    if obs.nlink <= 1 {
        obs.size
    } else {
        0
    }
}

fn link_failed(error: &LinkReplaceError) -> Classification {
    let data_loss = error.is_data_loss();
    if data_loss {
        log::error!("CONTENT MAY BE LOST: {}", error);
    } else {
        log::warn!(
            "Failed to replace {} with a hardlink: {}",
            error.path().display(),
            error
        );
    }
    Classification::LinkFailed { data_loss }
}
