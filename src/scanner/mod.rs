//! Scanner module for directory traversal, inode resolution and content hashing.
//!
//! This module provides functionality for:
//! - Sequential consumption of a `jwalk` directory walk
//! - Content hashing with BLAKE3 in bounded chunks
//! - `(device, inode)` identity resolution
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal producing regular-file paths
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//! - [`inode`]: Filesystem identity for a path
//!
//! # Example
//!
//! ```no_run
//! use dupelink::scanner::{inode, Hasher, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/srv/backups"), WalkerConfig::default());
//! let hasher = Hasher::new();
//! for entry in walker.walk() {
//!     let Ok(path) = entry else { continue };
//!     if let Ok(obs) = inode::resolve(&path) {
//!         let digest = hasher.digest(&obs.path).unwrap();
//!         println!("{:?} {}", obs.inode, dupelink::scanner::hash_to_hex(&digest));
//!     }
//! }
//! ```

pub mod hasher;
pub mod inode;
pub mod walker;

use std::path::PathBuf;

pub use hasher::{hash_to_hex, hex_to_hash, Digest, Hasher, DEFAULT_BUFFER_SIZE};
pub use inode::{FileObservation, InodeKey};
pub use walker::Walker;

/// Configuration for directory walking.
///
/// Controls which enumerated entries reach the deduplicator. Directories and
/// symbolic links are always excluded.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Minimum file size to include (in bytes).
    /// Files smaller than this are not yielded.
    pub min_size: Option<u64>,

    /// Glob patterns to ignore (gitignore-style).
    /// Matched relative to the root; `.gitignore` files are not consulted.
    pub ignore_patterns: Vec<String>,
}

impl WalkerConfig {
    /// Set whether hidden entries are skipped.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip_hidden: bool) -> Self {
        self.skip_hidden = skip_hidden;
        self
    }

    /// Set the minimum file size filter.
    #[must_use]
    pub fn with_min_size(mut self, min_size: Option<u64>) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set the ignore patterns.
    #[must_use]
    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }
}

/// Errors that can occur while enumerating the tree.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when reading a directory entry.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The entry vanished between listing and inspection.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while walking.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while resolving a path's inode identity.
#[derive(thiserror::Error, Debug)]
pub enum StatError {
    /// The path no longer exists.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when stat'ing the path.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path is no longer a regular file (e.g. replaced by a symlink).
    #[error("Not a regular file: {0}")]
    NotRegularFile(PathBuf),

    /// The platform does not expose inode numbers.
    #[error("Inode identity is not supported on this platform: {0}")]
    Unsupported(PathBuf),

    /// Any other stat failure.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    pub(crate) fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
