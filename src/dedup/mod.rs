//! Hardlink deduplication.
//!
//! This module provides:
//! - [`DuplicateIndex`] and [`InodeClassMap`], the two maps of a run
//! - [`Deduplicator`], the per-file classification state machine
//! - [`RunStats`], the counters reported at the end of a run
//!
//! Each regular file is classified into exactly one of four outcomes:
//!
//! | Outcome | Condition | Action |
//! |---|---|---|
//! | new content | unknown inode, unknown digest | inode becomes canonical |
//! | real hardlink | inode is canonical | none |
//! | duplicate | unknown inode, known digest | relink to canonical path |
//! | orphaned hardlink | inode already superseded | relink without hashing |

pub mod index;
pub mod orchestrator;
pub mod stats;

pub use index::{ClassEntry, ClassMapError, DuplicateIndex, InodeClass, InodeClassMap};
pub use orchestrator::{
    Classification, DedupConfig, DedupContext, Deduplicator, SkipReason,
    DEFAULT_PROGRESS_INTERVAL,
};
pub use stats::RunStats;
