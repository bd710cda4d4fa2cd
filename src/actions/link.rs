//! Replace a file with a hardlink to its canonical copy.
//!
//! # Overview
//!
//! [`LinkManager::replace_with_hardlink`] makes `source` a new directory entry
//! for the inode behind `target`. Two strategies are available:
//!
//! - [`LinkStrategy::UnlinkThenLink`] (default): `unlink(source)` followed by
//!   `link(target, source)`.
//! - [`LinkStrategy::LinkThenRename`]: `link(target, tmp)` into a sibling
//!   temporary name followed by `rename(tmp, source)`.
//!
//! # Data-loss window
//!
//! With `UnlinkThenLink`, a link failure after a successful unlink leaves
//! `source` missing. If `source` held the only copy of its content that
//! content is gone. That outcome is reported as
//! [`LinkReplaceError::SourceLost`] and is never retried. `LinkThenRename`
//! keeps `source` intact on every failure path.
//!
//! Hardlinks cannot span devices. Callers that know both device numbers check
//! them with [`LinkManager::ensure_same_device`] before anything is unlinked;
//! an `EXDEV` that still slips through surfaces as an ordinary link error.
//!
//! # Example
//!
//! ```no_run
//! use dupelink::actions::link::{LinkManager, LinkStrategy};
//! use std::path::Path;
//!
//! let mut manager = LinkManager::new(LinkStrategy::LinkThenRename, false);
//! match manager.replace_with_hardlink(Path::new("b.txt"), Path::new("a.txt")) {
//!     Ok(()) => println!("b.txt now shares a.txt's inode"),
//!     Err(e) if e.is_data_loss() => eprintln!("LOST: {}", e),
//!     Err(e) => eprintln!("skipped: {}", e),
//! }
//! ```

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest file name, in bytes, common filesystems accept.
const NAME_MAX: usize = 255;

/// Filesystem calls used by the link manager.
///
/// [`StdFileSystem`] is the real implementation; tests substitute failing ones.
pub trait FileSystem {
    /// Remove a directory entry.
    fn unlink(&self, path: &Path) -> io::Result<()>;

    /// Create `link` as a new directory entry for `original`'s inode.
    fn hard_link(&self, original: &Path, link: &Path) -> io::Result<()>;

    /// Atomically move `from` over `to`.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn unlink(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn hard_link(&self, original: &Path, link: &Path) -> io::Result<()> {
        std::fs::hard_link(original, link)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }
}

/// How the source entry is swapped for a hardlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkStrategy {
    /// Unlink the source, then link the target at the source path.
    #[default]
    UnlinkThenLink,
    /// Link the target at a temporary sibling, then rename it over the source.
    LinkThenRename,
}

impl std::fmt::Display for LinkStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnlinkThenLink => write!(f, "unlink-then-link"),
            Self::LinkThenRename => write!(f, "link-then-rename"),
        }
    }
}

/// Error type for hardlink replacement.
#[derive(Debug, Error)]
pub enum LinkReplaceError {
    /// Removing the source failed; the source is untouched.
    #[error("failed to unlink {path}: {source}")]
    Unlink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The link failed after the source was unlinked; the source path is gone.
    #[error("{path} was unlinked but linking it to {target} failed, the path is now missing: {source}")]
    SourceLost {
        path: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Creating the temporary link failed; the source is untouched.
    #[error("failed to link {target} for {path}: {source}")]
    Link {
        path: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Source and target live on different devices; nothing was attempted.
    #[error("{path} and {target} are on different devices")]
    CrossDevice { path: PathBuf, target: PathBuf },

    /// Renaming the temporary link over the source failed; the source is untouched.
    #[error("failed to rename temporary link over {path}: {source}")]
    Rename {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LinkReplaceError {
    /// Whether this failure may have destroyed content.
    #[must_use]
    pub fn is_data_loss(&self) -> bool {
        matches!(self, Self::SourceLost { .. })
    }

    /// The path that was being replaced.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Unlink { path, .. }
            | Self::SourceLost { path, .. }
            | Self::Link { path, .. }
            | Self::CrossDevice { path, .. }
            | Self::Rename { path, .. } => path,
        }
    }

    /// Whether the failure came from linking across devices.
    #[must_use]
    pub fn is_cross_device(&self) -> bool {
        let source = match self {
            Self::CrossDevice { .. } => return true,
            Self::Unlink { source, .. }
            | Self::SourceLost { source, .. }
            | Self::Link { source, .. }
            | Self::Rename { source, .. } => source,
        };
        source.kind() == io::ErrorKind::CrossesDevices
    }
}

/// Performs the destructive replace-with-hardlink operation.
#[derive(Debug)]
pub struct LinkManager<F: FileSystem = StdFileSystem> {
    fs: F,
    strategy: LinkStrategy,
    dry_run: bool,
    temp_counter: u64,
}

impl LinkManager<StdFileSystem> {
    /// Create a manager operating on the real filesystem.
    #[must_use]
    pub fn new(strategy: LinkStrategy, dry_run: bool) -> Self {
        Self::with_filesystem(StdFileSystem, strategy, dry_run)
    }
}

impl<F: FileSystem> LinkManager<F> {
    /// Create a manager operating through `fs`.
    #[must_use]
    pub fn with_filesystem(fs: F, strategy: LinkStrategy, dry_run: bool) -> Self {
        Self {
            fs,
            strategy,
            dry_run,
            temp_counter: 0,
        }
    }

    /// Whether mutations are suppressed.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Refuse a replacement whose two inodes live on different devices.
    ///
    /// Checked in dry-run mode too, since the real run would fail the same way.
    ///
    /// # Errors
    ///
    /// [`LinkReplaceError::CrossDevice`] if `source_dev != target_dev`.
    pub fn ensure_same_device(
        &self,
        source: &Path,
        source_dev: u64,
        target: &Path,
        target_dev: u64,
    ) -> Result<(), LinkReplaceError> {
        if source_dev == target_dev {
            return Ok(());
        }
        Err(LinkReplaceError::CrossDevice {
            path: source.to_path_buf(),
            target: target.to_path_buf(),
        })
    }

    /// Replace `source` with a hardlink to `target`.
    ///
    /// In dry-run mode nothing is touched and `Ok(())` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`LinkReplaceError`]; see [`LinkReplaceError::is_data_loss`]
    /// for the one variant that leaves `source` missing.
    pub fn replace_with_hardlink(
        &mut self,
        source: &Path,
        target: &Path,
    ) -> Result<(), LinkReplaceError> {
        if self.dry_run {
            log::debug!(
                "[dry-run] Would link {} --> {}",
                source.display(),
                target.display()
            );
            return Ok(());
        }

        match self.strategy {
            LinkStrategy::UnlinkThenLink => self.unlink_then_link(source, target),
            LinkStrategy::LinkThenRename => self.link_then_rename(source, target),
        }
    }

    fn unlink_then_link(&self, source: &Path, target: &Path) -> Result<(), LinkReplaceError> {
        self.fs
            .unlink(source)
            .map_err(|e| LinkReplaceError::Unlink {
                path: source.to_path_buf(),
                source: e,
            })?;

        self.fs
            .hard_link(target, source)
            .map_err(|e| LinkReplaceError::SourceLost {
                path: source.to_path_buf(),
                target: target.to_path_buf(),
                source: e,
            })
    }

    fn link_then_rename(&mut self, source: &Path, target: &Path) -> Result<(), LinkReplaceError> {
        let temp = self.temp_path_for(source);

        self.fs
            .hard_link(target, &temp)
            .map_err(|e| LinkReplaceError::Link {
                path: source.to_path_buf(),
                target: target.to_path_buf(),
                source: e,
            })?;

        if let Err(e) = self.fs.rename(&temp, source) {
            if let Err(cleanup) = self.fs.unlink(&temp) {
                log::warn!(
                    "Failed to remove temporary link {}: {}",
                    temp.display(),
                    cleanup
                );
            }
            return Err(LinkReplaceError::Rename {
                path: source.to_path_buf(),
                source: e,
            });
        }
        Ok(())
    }

    /// Sibling of `source` named `.<name>.dupelink-<pid>-<n>.tmp`.
    ///
    /// Falls back to `.dupelink-<pid>-<n>.tmp` when the long form would
    /// exceed [`NAME_MAX`].
    fn temp_path_for(&mut self, source: &Path) -> PathBuf {
        self.temp_counter += 1;
        let suffix = format!(
            ".dupelink-{}-{}.tmp",
            std::process::id(),
            self.temp_counter
        );
        let file_name = source.file_name().unwrap_or_default();
        if 1 + file_name.len() + suffix.len() > NAME_MAX {
            return source.with_file_name(suffix);
        }
        let mut name = OsString::from(".");
        name.push(file_name);
        name.push(suffix);
        source.with_file_name(name)
    }
}
