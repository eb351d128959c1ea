//! Configuration management for the record validator
//!
//! Settings come from an optional YAML, JSON or TOML file, then from
//! command-line flags and `PACKETCRYPT_*` environment variables.

use crate::error::{Error, Result};
use crate::validator::RecordKind;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[clap(
    name = "packetcrypt-wire",
    about = "Structural validation and inspection of PacketCrypt wire records",
    version
)]
pub struct Args {
    /// Configuration file path (YAML, JSON or TOML)
    #[clap(short, long, value_name = "FILE", env = "PACKETCRYPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Kind of record contained in the input
    #[clap(short, long, value_enum)]
    pub kind: Option<RecordKind>,

    /// Record bytes as hex
    #[clap(long, conflicts_with = "input")]
    pub hex: Option<String>,

    /// File holding the raw record bytes, `-` for stdin
    #[clap(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Print the decoded record as JSON
    #[clap(long)]
    pub inspect: bool,

    /// Print the effective configuration and exit
    #[clap(long)]
    pub print_config: bool,

    /// Peer label attached to log lines
    #[clap(long)]
    pub peer: Option<String>,

    /// Connection identifier attached to log lines
    #[clap(long)]
    pub connection: Option<u64>,

    /// Log level
    #[clap(short, long, env = "PACKETCRYPT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format (plain, json, pretty)
    #[clap(long, env = "PACKETCRYPT_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Validator threads (0 = all cores)
    #[clap(short, long, env = "PACKETCRYPT_THREADS")]
    pub threads: Option<usize>,

    /// Number of pre-allocated validation contexts
    #[clap(long, env = "PACKETCRYPT_POOL_CAPACITY")]
    pub pool_capacity: Option<usize>,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Validator configuration
    #[serde(default)]
    pub validator: ValidatorConfig,

    /// Validation context pool configuration
    #[serde(default)]
    pub pool: PoolConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Validator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Threads for batch validation (0 = all cores)
    #[serde(default)]
    pub threads: usize,
}

/// Validation context pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of pre-allocated contexts
    #[serde(default = "default_pool_capacity")]
    pub capacity: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (plain, json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

const LOG_FORMATS: [&str; 3] = ["plain", "json", "pretty"];

// Default value functions
fn default_pool_capacity() -> usize {
    num_cpus::get()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "plain".to_string()
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { threads: 0 }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: default_pool_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file {}: {}", path.display(), e)))?;
        Self::from_contents(&contents, &path.to_string_lossy())
    }

    /// Parse configuration text, picking the format from the file name
    ///
    /// Unknown extensions are sniffed: `{` means JSON, a `[section]` line means
    /// TOML, anything else is YAML.
    pub fn from_contents(contents: &str, name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        let config: Self = if lower.ends_with(".json") {
            serde_json::from_str(contents)?
        } else if lower.ends_with(".toml") {
            toml::from_str(contents)?
        } else if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            serde_yaml::from_str(contents)?
        } else {
            let trimmed = contents.trim_start();
            if trimmed.starts_with('{') {
                serde_json::from_str(contents)?
            } else if trimmed.starts_with('[') {
                toml::from_str(contents)?
            } else {
                serde_yaml::from_str(contents)?
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(level) = &args.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &args.log_format {
            config.logging.format = format.clone();
        }
        if let Some(threads) = args.threads {
            config.validator.threads = threads;
        }
        if let Some(capacity) = args.pool_capacity {
            config.pool.capacity = capacity;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.pool.capacity == 0 {
            return Err(Error::config("Pool capacity must be greater than 0"));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(Error::config(format!(
                "Invalid log format: {}. Must be one of: {}",
                self.logging.format,
                LOG_FORMATS.join(", ")
            )));
        }

        if self.logging.level.trim().is_empty() {
            return Err(Error::config("Log level must not be empty"));
        }

        Ok(())
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
