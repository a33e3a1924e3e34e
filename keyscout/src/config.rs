use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{ScanError, SearchResult};
use crate::filters::DEFAULT_EXTENSION;

/// Configuration for a keyword search.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.keyscout.yaml` in the current directory
/// 3. Global `$HOME/.config/keyscout/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Keywords to look for (case-insensitive)
/// keywords: ["todo", "fixme"]
///
/// # File or directory to scan
/// root_path: "notes"
///
/// # Extensions of files to scan when walking a directory
/// extensions: ["txt"]
///
/// # Worker count (default: CPU cores)
/// worker_count: 4
///
/// # Concurrency strategy (shared|isolated)
/// strategy: isolated
///
/// # Invalid UTF-8 handling (ignore|replace)
/// decode_mode: ignore
///
/// # Give up after this long (humantime syntax)
/// timeout: "30s"
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// When using the CLI, command-line arguments take precedence over config
/// file values; see [`SearchConfig::merge_with_cli`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Keywords to search for, in output order
    #[serde(default)]
    pub keywords: Vec<String>,

    /// File or directory to scan
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// File name extensions collected while walking a directory
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Number of workers scanning files concurrently
    /// Defaults to number of CPU cores if not specified
    #[serde(default = "default_worker_count")]
    pub worker_count: NonZeroUsize,

    /// How files are distributed across workers
    #[serde(default)]
    pub strategy: Strategy,

    /// How invalid UTF-8 in scanned files is handled
    #[serde(default)]
    pub decode_mode: DecodeMode,

    /// Optional overall deadline, e.g. "500ms" or "2m"
    #[serde(default)]
    pub timeout: Option<String>,

    /// Whether to only show statistics instead of the keyword mapping
    #[serde(default)]
    pub stats_only: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Work distribution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Fixed-size thread pool; every file is an independent task
    #[default]
    Shared,
    /// One thread per round-robin chunk, reporting over a channel
    Isolated,
}

impl std::str::FromStr for Strategy {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shared" | "threads" => Ok(Strategy::Shared),
            "isolated" | "queue" => Ok(Strategy::Isolated),
            other => Err(ScanError::config_error(format!(
                "Unknown strategy '{}', expected shared or isolated",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Shared => write!(f, "shared"),
            Strategy::Isolated => write!(f, "isolated"),
        }
    }
}

/// Handling of byte sequences that are not valid UTF-8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Drop invalid sequences
    #[default]
    Ignore,
    /// Substitute U+FFFD for invalid sequences
    Replace,
}

impl std::str::FromStr for DecodeMode {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(DecodeMode::Ignore),
            "replace" | "lossy" => Ok(DecodeMode::Replace),
            other => Err(ScanError::config_error(format!(
                "Unknown decode mode '{}', expected ignore or replace",
                other
            ))),
        }
    }
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_extensions() -> Vec<String> {
    vec![DEFAULT_EXTENSION.to_string()]
}

pub fn default_worker_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            root_path: default_root_path(),
            extensions: default_extensions(),
            worker_count: default_worker_count(),
            strategy: Strategy::default(),
            decode_mode: DecodeMode::default(),
            timeout: None,
            stats_only: false,
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Creates a configuration for the given root and keywords with defaults elsewhere
    pub fn new<S: Into<String>>(root_path: impl Into<PathBuf>, keywords: Vec<S>) -> Self {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            root_path: root_path.into(),
            ..Default::default()
        }
    }

    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // Default config locations
        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("keyscout/config.yaml")),
            // Local config
            Some(PathBuf::from(".keyscout.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Parses the configured timeout, if any
    pub fn timeout(&self) -> SearchResult<Option<Duration>> {
        self.timeout
            .as_deref()
            .map(|raw| {
                humantime::parse_duration(raw).map_err(|e| ScanError::invalid_duration(raw, e))
            })
            .transpose()
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// Every value given on the command line wins, even one equal to the
    /// built-in default; values left unset keep whatever the file said.
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if !cli.keywords.is_empty() {
            self.keywords = cli.keywords;
        }
        if let Some(root_path) = cli.root_path {
            self.root_path = root_path;
        }
        if let Some(extensions) = cli.extensions {
            self.extensions = extensions;
        }
        if let Some(worker_count) = cli.worker_count {
            self.worker_count = worker_count;
        }
        if let Some(strategy) = cli.strategy {
            self.strategy = strategy;
        }
        if let Some(decode_mode) = cli.decode_mode {
            self.decode_mode = decode_mode;
        }
        if cli.timeout.is_some() {
            self.timeout = cli.timeout;
        }
        if cli.stats_only {
            self.stats_only = true;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }
}

/// Values given explicitly on the command line; `None` means not given
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub keywords: Vec<String>,
    pub root_path: Option<PathBuf>,
    pub extensions: Option<Vec<String>>,
    pub worker_count: Option<NonZeroUsize>,
    pub strategy: Option<Strategy>,
    pub decode_mode: Option<DecodeMode>,
    pub timeout: Option<String>,
    pub stats_only: bool,
    pub log_level: Option<String>,
}
