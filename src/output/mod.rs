//! End-of-run summary formatters.
//!
//! - [`TextSummary`]: human-readable, optionally colored, for stderr
//! - [`JsonSummary`]: machine-readable, for stdout with `--json`
//!
//! # Example
//!
//! ```no_run
//! use dupelink::dedup::RunStats;
//! use dupelink::output::TextSummary;
//!
//! let stats = RunStats::new();
//! TextSummary::new(&stats, false)
//!     .write_to(&mut std::io::stderr())
//!     .unwrap();
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutputError, JsonSummary};
pub use text::TextSummary;
