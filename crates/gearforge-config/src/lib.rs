//! Configuration system for GearForge.
//!
//! Load search configuration from TOML or YAML files to control threading,
//! partitioning, progress reporting and termination without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use gearforge_config::{SearchConfig, ThreadCount};
//! use std::time::Duration;
//!
//! let config = SearchConfig::from_toml_str(r#"
//!     thread_count = { count = 8 }
//!     partitions_per_worker = 2
//!     roll_mode = "average"
//!
//!     [termination]
//!     seconds_spent_limit = 30
//! "#).unwrap();
//!
//! assert_eq!(config.thread_count, ThreadCount::Count(8));
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use gearforge_config::SearchConfig;
//!
//! let config = SearchConfig::load("search.toml").unwrap_or_default();
//! assert_eq!(config.partitions_per_worker, 4);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use gearforge_core::RollMode;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main search configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchConfig {
    /// Number of parallel workers; `none` searches on the calling thread.
    #[serde(default)]
    pub thread_count: ThreadCount,

    /// Partitions created per worker for re-dispatch.
    #[serde(default = "default_partitions_per_worker")]
    pub partitions_per_worker: usize,

    /// Leaves between progress events.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Leaves between yields in cooperative mode.
    #[serde(default = "default_yield_interval")]
    pub yield_interval: u64,

    /// How rolled stat ranges collapse to one value.
    #[serde(default)]
    pub roll_mode: RollMode,

    /// Mana deficit tolerated by the sustainable mana check.
    #[serde(default = "default_mana_tolerance")]
    pub mana_tolerance: f64,

    /// Termination configuration.
    #[serde(default)]
    pub termination: Option<TerminationConfig>,
}

fn default_partitions_per_worker() -> usize {
    4
}

fn default_progress_interval() -> u64 {
    50_000
}

fn default_yield_interval() -> u64 {
    10_000
}

fn default_mana_tolerance() -> f64 {
    5.0
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            thread_count: ThreadCount::default(),
            partitions_per_worker: default_partitions_per_worker(),
            progress_interval: default_progress_interval(),
            yield_interval: default_yield_interval(),
            roll_mode: RollMode::default(),
            mana_tolerance: default_mana_tolerance(),
            termination: None,
        }
    }
}

impl SearchConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero intervals and partition counts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.partitions_per_worker == 0 {
            return Err(ConfigError::Invalid(
                "partitions_per_worker must be at least 1".into(),
            ));
        }
        if self.progress_interval == 0 || self.yield_interval == 0 {
            return Err(ConfigError::Invalid(
                "progress_interval and yield_interval must be at least 1".into(),
            ));
        }
        if let ThreadCount::Count(0) = self.thread_count {
            return Err(ConfigError::Invalid("thread_count must be at least 1".into()));
        }
        if !(self.mana_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "mana_tolerance must be non-negative, got {}",
                self.mana_tolerance
            )));
        }
        Ok(())
    }

    pub fn with_thread_count(mut self, thread_count: ThreadCount) -> Self {
        self.thread_count = thread_count;
        self
    }

    pub fn with_roll_mode(mut self, roll_mode: RollMode) -> Self {
        self.roll_mode = roll_mode;
        self
    }

    pub fn with_partitions_per_worker(mut self, n: usize) -> Self {
        self.partitions_per_worker = n;
        self
    }

    pub fn with_progress_interval(mut self, leaves: u64) -> Self {
        self.progress_interval = leaves;
        self
    }

    pub fn with_yield_interval(mut self, leaves: u64) -> Self {
        self.yield_interval = leaves;
        self
    }

    /// Sets the termination time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the leaf count limit.
    pub fn with_leaf_count_limit(mut self, leaves: u64) -> Self {
        self.termination = Some(TerminationConfig {
            leaf_count_limit: Some(leaves),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Returns the termination time limit, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }

    /// Returns the leaf count limit, if configured.
    pub fn leaf_count_limit(&self) -> Option<u64> {
        self.termination.as_ref().and_then(|t| t.leaf_count_limit)
    }
}

/// Worker thread count configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadCount {
    /// One worker per available core.
    #[default]
    Auto,

    /// No workers; search cooperatively on the calling thread.
    None,

    /// Specific number of workers.
    Count(usize),
}

impl ThreadCount {
    /// Number of workers to start; `None` when searching cooperatively.
    pub fn resolve(self) -> Option<usize> {
        match self {
            ThreadCount::Auto => Some(
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1),
            ),
            ThreadCount::None => None,
            ThreadCount::Count(n) => Some(n.max(1)),
        }
    }
}

/// Termination configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Maximum seconds to spend searching.
    pub seconds_spent_limit: Option<u64>,

    /// Maximum minutes to spend searching.
    pub minutes_spent_limit: Option<u64>,

    /// Maximum number of evaluated leaves, per worker.
    pub leaf_count_limit: Option<u64>,
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let seconds =
            self.seconds_spent_limit.unwrap_or(0) + self.minutes_spent_limit.unwrap_or(0) * 60;
        if seconds > 0 {
            Some(Duration::from_secs(seconds))
        } else {
            None
        }
    }
}
