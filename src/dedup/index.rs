//! Bookkeeping maps for one deduplication run.
//!
//! - [`DuplicateIndex`]: content digest → canonical inode. First-seen wins;
//!   an entry is never replaced.
//! - [`InodeClassMap`]: inode → (canonical inode, last-known path). An inode
//!   is canonical iff it maps to itself.
//!
//! Together they let every path sharing an already-classified inode be
//! resolved without hashing it again.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::{Digest, InodeKey};

/// Maps a content digest to the inode holding the retained copy.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    by_digest: HashMap<Digest, InodeKey>,
}

impl DuplicateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical inode for `digest`, if the content has been seen.
    #[must_use]
    pub fn get(&self, digest: &Digest) -> Option<InodeKey> {
        self.by_digest.get(digest).copied()
    }

    /// Register `inode` as canonical for `digest`.
    ///
    /// Returns `false` and leaves the index untouched if the digest is
    /// already present.
    pub fn insert_first(&mut self, digest: Digest, inode: InodeKey) -> bool {
        match self.by_digest.entry(digest) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(inode);
                true
            }
        }
    }

    /// Number of distinct contents seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_digest.len()
    }

    /// Whether no content has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_digest.is_empty()
    }

    /// Iterate over `(digest, canonical inode)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Digest, &InodeKey)> {
        self.by_digest.iter()
    }
}

/// Entry of the [`InodeClassMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    /// Inode holding the retained copy of this inode's content.
    pub canonical: InodeKey,
    /// Path through which this inode was classified.
    pub last_known_path: PathBuf,
}

/// How a previously seen inode relates to its content's canonical copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeClass<'a> {
    /// The inode is itself canonical; `path` introduced its content.
    Canonical { path: &'a Path },
    /// The inode was replaced by `canonical`, reachable through `canonical_path`.
    Superseded {
        canonical: InodeKey,
        canonical_path: &'a Path,
    },
}

/// Rejected [`InodeClassMap::insert_superseded`] call.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClassMapError {
    /// The proposed canonical inode is unknown, superseded, or the inode itself.
    #[error("inode {0} is not canonical")]
    NotCanonical(InodeKey),
    /// The inode already has an entry.
    #[error("inode {0} is already classified")]
    AlreadyClassified(InodeKey),
}

/// Maps each classified inode to its canonical inode and last-known path.
#[derive(Debug, Default)]
pub struct InodeClassMap {
    entries: HashMap<InodeKey, ClassEntry>,
}

impl InodeClassMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw entry for `inode`.
    #[must_use]
    pub fn get(&self, inode: &InodeKey) -> Option<&ClassEntry> {
        self.entries.get(inode)
    }

    /// Classify a known inode, or `None` if it has not been seen.
    #[must_use]
    pub fn classify(&self, inode: &InodeKey) -> Option<InodeClass<'_>> {
        let entry = self.entries.get(inode)?;
        if entry.canonical == *inode {
            return Some(InodeClass::Canonical {
                path: &entry.last_known_path,
            });
        }
        let canonical_path = self.canonical_path(&entry.canonical)?;
        Some(InodeClass::Superseded {
            canonical: entry.canonical,
            canonical_path,
        })
    }

    /// Path of a canonical inode, or `None` if `inode` is unknown or superseded.
    #[must_use]
    pub fn canonical_path(&self, inode: &InodeKey) -> Option<&Path> {
        self.entries
            .get(inode)
            .filter(|entry| entry.canonical == *inode)
            .map(|entry| entry.last_known_path.as_path())
    }

    /// Record `inode` as canonical, first seen at `path`.
    ///
    /// Returns `false` and changes nothing if the inode already has an entry.
    pub fn insert_canonical(&mut self, inode: InodeKey, path: PathBuf) -> bool {
        match self.entries.entry(inode) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(ClassEntry {
                    canonical: inode,
                    last_known_path: path,
                });
                true
            }
        }
    }

    /// Record that `inode` (seen at `path`) now resolves to `canonical`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassMapError::AlreadyClassified`] if `inode` has an entry,
    /// and [`ClassMapError::NotCanonical`] if `canonical` is not a canonical
    /// inode of this map.
    pub fn insert_superseded(
        &mut self,
        inode: InodeKey,
        canonical: InodeKey,
        path: PathBuf,
    ) -> Result<(), ClassMapError> {
        if self.entries.contains_key(&inode) {
            return Err(ClassMapError::AlreadyClassified(inode));
        }
        if self.canonical_path(&canonical).is_none() {
            return Err(ClassMapError::NotCanonical(canonical));
        }
        self.entries.insert(
            inode,
            ClassEntry {
                canonical,
                last_known_path: path,
            },
        );
        Ok(())
    }

    /// Number of classified inodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no inode has been classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of canonical inodes.
    #[must_use]
    pub fn canonical_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(inode, entry)| entry.canonical == **inode)
            .count()
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&InodeKey, &ClassEntry)> {
        self.entries.iter()
    }
}
