//! dupelink - collapse duplicate files into hardlinks
//!
//! Walks one directory tree, hashes each regular file with BLAKE3, and replaces
//! every later copy of already-seen content with a hardlink to the first copy.
//! Files that already share an inode are recognised through their
//! `(device, inode)` identity and are never hashed twice.

pub mod actions;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Config;
use crate::dedup::{Deduplicator, RunStats};
use crate::error::{AppError, ExitCode};
use crate::output::{JsonSummary, TextSummary};
use crate::progress::Progress;
use crate::scanner::Walker;

/// Run the application logic.
///
/// # Errors
///
/// Returns an [`AppError`] (inside `anyhow`) for an unusable root directory or
/// invalid configuration. Per-file failures never surface here.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);

    let config = Config::from_cli(&cli).map_err(|e| AppError::Config(e.to_string()))?;
    let root = validate_root(&cli.path)?;

    let mut dedup_config = config.dedup_config();
    if cli.progress_bar && !cli.quiet && std::io::stderr().is_terminal() {
        dedup_config = dedup_config.with_progress_callback(Arc::new(Progress::new()));
    }

    log::info!(
        "Deduplicating {} ({}{})",
        root.display(),
        config.link_strategy,
        if config.dry_run { ", dry run" } else { "" }
    );

    let walker = Walker::new(&root, config.walker_config());
    let mut dedup = Deduplicator::new(dedup_config);
    let stats = dedup.run(walker.walk());

    if stats.sources_lost > 0 {
        log::error!(
            "{} path(s) were removed but could not be relinked; see errors above",
            stats.sources_lost
        );
    }

    let exit_code = ExitCode::Success;
    if let Err(e) = write_summary(&cli, &root, &config, &stats, exit_code) {
        log::warn!("Failed to write summary: {}", e);
    }

    Ok(exit_code)
}

/// Write the end-of-run summary: JSON on stdout or text on stderr.
fn write_summary(
    cli: &Cli,
    root: &Path,
    config: &Config,
    stats: &RunStats,
    exit_code: ExitCode,
) -> Result<()> {
    if cli.json {
        JsonSummary::new(root, stats, config.dry_run, config.link_strategy, exit_code)
            .write_to(&mut std::io::stdout().lock())?;
    } else {
        let stderr = std::io::stderr();
        let color = !cli.no_color && stderr.is_terminal();
        TextSummary::new(stats, config.dry_run)
            .with_color(color)
            .write_to(&mut stderr.lock())?;
    }
    Ok(())
}

/// Check that `path` names an existing directory and make it absolute.
///
/// # Errors
///
/// [`AppError::RootNotFound`] if `path` cannot be stat'ed,
/// [`AppError::NotADirectory`] if it is not a directory.
pub fn validate_root(path: &Path) -> Result<PathBuf, AppError> {
    let metadata =
        std::fs::metadata(path).map_err(|_| AppError::RootNotFound(path.to_path_buf()))?;
    if !metadata.is_dir() {
        return Err(AppError::NotADirectory(path.to_path_buf()));
    }
    std::path::absolute(path).map_err(|_| AppError::RootNotFound(path.to_path_buf()))
}
