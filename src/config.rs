//! Application configuration.
//!
//! Settings are layered with figment, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory, or the file given with
//!    `--config`
//! 3. `DUPELINK_`-prefixed environment variables (`DUPELINK_VERIFY=true`)
//! 4. Command-line flags
//!
//! ```toml
//! verify = true
//! link_strategy = "link-then-rename"
//! min_size = 4096
//! ignore_patterns = ["*.tmp", "node_modules/"]
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::LinkStrategy;
use crate::cli::Cli;
use crate::dedup::{DedupConfig, DEFAULT_PROGRESS_INTERVAL};
use crate::scanner::{WalkerConfig, DEFAULT_BUFFER_SIZE};

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "DUPELINK_";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file passed with `--config` does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has the wrong shape.
    #[error("{0}")]
    Load(#[source] Box<figment::Error>),

    /// The merged settings are inconsistent.
    #[error("{0}")]
    Invalid(String),
}

/// Merged application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classify without modifying anything.
    pub dry_run: bool,
    /// Byte-compare digest matches before relinking.
    pub verify: bool,
    /// How duplicates are replaced.
    pub link_strategy: LinkStrategy,
    /// Files between progress reports.
    pub progress_interval: u64,
    /// Read buffer size for hashing.
    pub hash_buffer_size: usize,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Ignore files smaller than this.
    pub min_size: Option<u64>,
    /// Gitignore-style exclusion patterns.
    pub ignore_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dry_run: false,
            verify: false,
            link_strategy: LinkStrategy::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            hash_buffer_size: DEFAULT_BUFFER_SIZE,
            skip_hidden: false,
            min_size: None,
            ignore_patterns: Vec::new(),
        }
    }
}

impl Config {
    /// Platform default location of `config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupelink").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Defaults, file and environment layers, without validation.
    ///
    /// `file` replaces the default location when given.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file.map(Path::to_path_buf).or_else(Self::default_path) {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the file and environment layers.
    ///
    /// # Errors
    ///
    /// Fails if an explicit `file` does not exist or a layer cannot be parsed.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = file {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }
        let config: Self = Self::figment(file)
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Load every layer, apply the command line and validate.
    ///
    /// # Errors
    ///
    /// See [`Config::load`] and [`Config::validate`].
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Self::load(cli.config.as_deref())?;
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Override settings with flags given on the command line.
    ///
    /// Boolean flags can only switch a setting on; ignore patterns are added
    /// to the configured ones.
    pub fn apply_cli(&mut self, cli: &Cli) {
        self.dry_run |= cli.dry_run;
        self.verify |= cli.verify;
        self.skip_hidden |= cli.skip_hidden;
        if cli.atomic {
            self.link_strategy = LinkStrategy::LinkThenRename;
        }
        if let Some(min_size) = cli.min_size {
            self.min_size = Some(min_size);
        }
        if let Some(interval) = cli.progress_interval {
            self.progress_interval = interval;
        }
        self.ignore_patterns
            .extend(cli.ignore_patterns.iter().cloned());
    }

    /// Check the merged settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero progress interval or a
    /// zero hash buffer size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_interval == 0 {
            return Err(ConfigError::Invalid(
                "progress_interval must be at least 1".to_string(),
            ));
        }
        if self.hash_buffer_size == 0 {
            return Err(ConfigError::Invalid(
                "hash_buffer_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Walker settings.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::default()
            .with_skip_hidden(self.skip_hidden)
            .with_min_size(self.min_size)
            .with_ignore_patterns(self.ignore_patterns.clone())
    }

    /// Deduplicator settings (without a progress reporter).
    #[must_use]
    pub fn dedup_config(&self) -> DedupConfig {
        DedupConfig::default()
            .with_strategy(self.link_strategy)
            .with_dry_run(self.dry_run)
            .with_verify(self.verify)
            .with_progress_interval(self.progress_interval)
            .with_hash_buffer_size(self.hash_buffer_size)
    }
}
