//! Command-line interface definitions for dupelink.
//!
//! # Example
//!
//! ```bash
//! # Collapse duplicates under a backup tree
//! dupelink /srv/backups
//!
//! # See what would happen without touching anything
//! dupelink --dry-run -v /srv/backups
//!
//! # Byte-verify matches and never leave a path missing
//! dupelink --verify --atomic /srv/backups
//!
//! # Leave small files and build output alone
//! dupelink --min-size 4KiB -i 'target/' /srv/backups
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Replace duplicate files in a directory tree with hardlinks.
///
/// Every regular file under PATH is hashed with BLAKE3. The first file seen
/// with a given content is kept; later copies are replaced by hardlinks to it.
/// Files that already share an inode are recognised and never re-hashed.
#[derive(Debug, Parser)]
#[command(name = "dupelink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to deduplicate
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Increase verbosity level (-v for per-file actions, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Classify and report without modifying anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Byte-compare each digest match before relinking
    #[arg(long)]
    pub verify: bool,

    /// Link to a temporary name and rename over the duplicate (never leaves a path missing)
    #[arg(long)]
    pub atomic: bool,

    /// Skip hidden files and directories
    #[arg(long)]
    pub skip_hidden: bool,

    /// Minimum file size to consider (e.g., 1KB, 1MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Gitignore-style pattern to exclude (can be repeated)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Files between progress reports
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub progress_interval: Option<u64>,

    /// Show a progress spinner instead of progress log lines
    #[arg(long)]
    pub progress_bar: bool,

    /// Print the final summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupelink::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
