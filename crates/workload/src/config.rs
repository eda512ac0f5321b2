//! Workload configuration.

use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Default node URL when none is given.
pub const DEFAULT_URL: &str = "tcp://127.0.0.1:40000";

/// Counter value at which a key chain is finished and a new key starts.
pub const DEFAULT_COMPLETION_THRESHOLD: u64 = 1_000_000;

/// Number of resolved batch ids remembered for duplicate detection.
pub const DEFAULT_RESOLVED_HISTORY: usize = 4096;

/// Configuration handed to the workload at construction.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadConfig {
    /// Node URLs to connect to.
    pub urls: Vec<String>,

    /// Target batch rate in batches per second. Must be greater than 0.
    pub rate: u32,

    /// Time between displays of batch rate updates.
    #[serde(deserialize_with = "deserialize_duration")]
    pub display_frequency: Duration,

    /// Counter value at which a key chain is finished.
    ///
    /// A committed batch whose counter is below this gets an increment; at or
    /// above it the key is abandoned and a fresh key starts.
    pub completion_threshold: u64,

    /// How many resolved batch ids to remember for duplicate detection.
    ///
    /// A repeated commit is recognised only while its batch id is within
    /// this window; older repeats are treated as untracked and start a new
    /// key. Must be greater than 0.
    pub resolved_history: usize,

    /// Seed for connection selection. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            urls: vec![DEFAULT_URL.to_string()],
            rate: 10,
            display_frequency: Duration::from_secs(30),
            completion_threshold: DEFAULT_COMPLETION_THRESHOLD,
            resolved_history: DEFAULT_RESOLVED_HISTORY,
            seed: None,
        }
    }
}

impl WorkloadConfig {
    /// Create a configuration for the given node URLs.
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls,
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_rate(mut self, rate: u32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_display_frequency(mut self, frequency: Duration) -> Self {
        self.display_frequency = frequency;
        self
    }

    pub fn with_completion_threshold(mut self, threshold: u64) -> Self {
        self.completion_threshold = threshold;
        self
    }

    pub fn with_resolved_history(mut self, capacity: usize) -> Self {
        self.resolved_history = capacity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Interval between batch submissions implied by the rate.
    pub fn submission_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate.max(1) as f64)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate == 0 {
            return Err(ConfigError::InvalidRate);
        }
        if self.urls.is_empty() {
            return Err(ConfigError::NoUrls);
        }
        if let Some(url) = self.urls.iter().find(|u| u.trim().is_empty()) {
            return Err(ConfigError::InvalidUrl(url.clone()));
        }
        if self.completion_threshold == 0 {
            return Err(ConfigError::InvalidThreshold);
        }
        if self.display_frequency.is_zero() {
            return Err(ConfigError::InvalidDisplayFrequency);
        }
        if self.resolved_history == 0 {
            return Err(ConfigError::InvalidResolvedHistory);
        }
        Ok(())
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(&s).map_err(serde::de::Error::custom)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Batch rate must be greater than 0")]
    InvalidRate,

    #[error("At least one node URL is required")]
    NoUrls,

    #[error("Invalid node URL: {0:?}")]
    InvalidUrl(String),

    #[error("Completion threshold must be greater than 0")]
    InvalidThreshold,

    #[error("Display frequency must be greater than 0")]
    InvalidDisplayFrequency,

    #[error("Resolved history must be greater than 0")]
    InvalidResolvedHistory,

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
