//! Fatal errors and exit codes.
//!
//! Per-file failures never surface here: they are logged, counted in
//! [`RunStats`](crate::dedup::RunStats) and the run continues. Only problems
//! that stop a run before it starts end up as an [`AppError`].

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Exit codes for dupelink.
///
/// - 0: the run completed (per-file errors included)
/// - 1: the command line or configuration was invalid
/// - 2: the root directory does not exist or is not a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// The run completed.
    Success = 0,
    /// Invalid arguments or configuration.
    UsageError = 1,
    /// The root directory could not be used.
    RootNotFound = 2,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DL000",
            Self::UsageError => "DL001",
            Self::RootNotFound => "DL002",
        }
    }
}

/// Errors that abort a run before any file is touched.
#[derive(Debug, Error)]
pub enum AppError {
    /// The root path does not exist.
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),

    /// The root path exists but is not a directory.
    #[error("Root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The configuration could not be loaded or is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    /// Exit code the process should terminate with.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::UsageError,
            Self::RootNotFound(_) | Self::NotADirectory(_) => ExitCode::RootNotFound,
        }
    }
}

/// Exit code for an arbitrary error chain.
///
/// Anything that is not an [`AppError`] is treated as a usage error.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    err.downcast_ref::<AppError>()
        .map_or(ExitCode::UsageError, AppError::exit_code)
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DL002")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
        }
    }
}
