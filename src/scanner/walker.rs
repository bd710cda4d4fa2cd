//! Directory walker built on jwalk.
//!
//! # Overview
//!
//! [`Walker`] produces the lazy, single-pass sequence of regular-file paths
//! that the deduplicator consumes. Directory reads may happen on jwalk's
//! worker threads, but entries are handed out through a plain iterator and
//! consumed sequentially.
//!
//! # Features
//!
//! - Children sorted by file name, so the order is stable on one filesystem
//! - Directories, symbolic links and special files are never yielded
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Hidden-entry and minimum-size filtering
//!
//! # Example
//!
//! ```no_run
//! use dupelink::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/srv/photos"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{ScanError, WalkerConfig};

/// Directory walker yielding absolute regular-file paths.
#[derive(Debug)]
pub struct Walker {
    /// Absolute root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// Relative roots are made absolute against the current directory.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        let root = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Self { root, config }
    }

    /// The absolute root being walked.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build the ignore matcher from the configured patterns.
    fn build_gitignore(&self) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check if a file passes the size filter.
    fn passes_size_filter(&self, path: &Path) -> bool {
        let Some(min) = self.config.min_size else {
            return true;
        };
        // A failed stat is left for the inode resolver to report.
        match std::fs::symlink_metadata(path) {
            Ok(metadata) => metadata.len() >= min,
            Err(_) => true,
        }
    }

    /// Walk the directory tree, yielding file paths.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        let gitignore = self.build_gitignore().map(Arc::new);
        let root = self.root.clone();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                if let Some(gi) = &gitignore {
                    // Dropping an ignored directory here also prunes its subtree.
                    children.retain(|child| match child {
                        Ok(entry) => {
                            let path = entry.path();
                            let ignored = is_ignored(gi, &root, &path, entry.file_type().is_dir());
                            if ignored {
                                log::trace!("Ignoring: {}", path.display());
                            }
                            !ignored
                        }
                        Err(_) => true,
                    });
                }
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", entry.path().display());
                        return None;
                    }
                    if !file_type.is_file() {
                        return None;
                    }

                    let path = entry.path();
                    if !self.passes_size_filter(&path) {
                        log::trace!("Skipping file below minimum size: {}", path.display());
                        return None;
                    }
                    Some(Ok(path))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(convert_jwalk_error(path, &e)))
                }
            })
    }
}

/// Match `path` against the ignore rules, relative to `root`.
fn is_ignored(gitignore: &Gitignore, root: &Path, path: &Path, is_dir: bool) -> bool {
    // The matcher panics on paths outside its root.
    let Ok(relative_path) = path.strip_prefix(root) else {
        return false;
    };
    gitignore
        .matched_path_or_any_parents(relative_path, is_dir)
        .is_ignore()
}

fn convert_jwalk_error(path: PathBuf, error: &jwalk::Error) -> ScanError {
    use std::io::ErrorKind;

    match error.io_error().map(std::io::Error::kind) {
        Some(ErrorKind::PermissionDenied) => ScanError::PermissionDenied(path),
        Some(ErrorKind::NotFound) => ScanError::NotFound(path),
        kind => ScanError::Io {
            path,
            source: std::io::Error::new(kind.unwrap_or(ErrorKind::Other), error.to_string()),
        },
    }
}
