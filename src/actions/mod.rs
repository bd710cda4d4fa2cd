//! Filesystem actions module.
//!
//! This module provides functionality for:
//! - Replacing a duplicate with a hardlink to its canonical copy
//! - Byte-by-byte verification of a digest match before relinking
//!
//! # Linking
//!
//! ```no_run
//! use dupelink::actions::{LinkManager, LinkStrategy};
//! use std::path::Path;
//!
//! let mut manager = LinkManager::new(LinkStrategy::UnlinkThenLink, false);
//! manager
//!     .replace_with_hardlink(Path::new("copy.jpg"), Path::new("original.jpg"))
//!     .unwrap();
//! ```
//!
//! # Verification
//!
//! ```no_run
//! use dupelink::actions::verify::files_identical;
//! use std::path::Path;
//!
//! let same = files_identical(Path::new("a.bin"), Path::new("b.bin"), 64 * 1024).unwrap();
//! ```

pub mod link;
pub mod verify;

// Re-export commonly used types
pub use link::{FileSystem, LinkManager, LinkReplaceError, LinkStrategy, StdFileSystem};
pub use verify::files_identical;
