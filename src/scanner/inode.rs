//! Inode identity resolution.
//!
//! # Overview
//!
//! Hardlinks are multiple directory entries pointing to the same inode on
//! disk. Deduplication keys everything on the `(device, inode)` pair, so two
//! paths are "the same file" exactly when their [`InodeKey`]s are equal.
//!
//! # Platform Support
//!
//! - **Unix**: Uses `(st_dev, st_ino)` from `lstat`
//! - **Other**: Resolution fails with [`StatError::Unsupported`]

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::StatError;

/// Filesystem identity of a file: device plus inode number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InodeKey {
    /// Device the inode lives on.
    pub dev: u64,
    /// Inode number within that device.
    pub ino: u64,
}

impl InodeKey {
    /// Create a key from raw device and inode numbers.
    #[must_use]
    pub const fn new(dev: u64, ino: u64) -> Self {
        Self { dev, ino }
    }

    /// Extract the key from file metadata.
    ///
    /// Returns `None` on platforms without inode numbers.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

impl std::fmt::Display for InodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.dev, self.ino)
    }
}

/// A path together with its resolved identity.
///
/// Created per enumerated path and dropped once the path is classified.
#[derive(Debug, Clone)]
pub struct FileObservation {
    /// The observed path.
    pub path: PathBuf,
    /// Identity of the inode the path points to.
    pub inode: InodeKey,
    /// File size in bytes.
    pub size: u64,
    /// Number of directory entries sharing the inode.
    pub nlink: u64,
}

/// Resolve the inode identity of `path`.
///
/// Symbolic links are not followed; a path that is not a regular file is
/// rejected.
///
/// # Errors
///
/// Returns [`StatError`] if the path cannot be stat'ed or is not a regular file.
pub fn resolve(path: &Path) -> Result<FileObservation, StatError> {
    let metadata = std::fs::symlink_metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => StatError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => StatError::PermissionDenied(path.to_path_buf()),
        _ => StatError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_file() {
        return Err(StatError::NotRegularFile(path.to_path_buf()));
    }

    let inode = InodeKey::from_metadata(&metadata)
        .ok_or_else(|| StatError::Unsupported(path.to_path_buf()))?;

    Ok(FileObservation {
        path: path.to_path_buf(),
        inode,
        size: metadata.len(),
        nlink: link_count(&metadata),
    })
}

#[cfg(unix)]
fn link_count(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.nlink()
}

#[cfg(not(unix))]
fn link_count(_metadata: &Metadata) -> u64 {
    1
}

/// Whether inode identity is available on this platform.
#[must_use]
pub const fn is_supported() -> bool {
    cfg!(unix)
}
