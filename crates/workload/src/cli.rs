//! Command-line arguments for binaries embedding the workload.
//!
//! Flatten [`WorkloadArgs`] into a `clap` parser and convert it with
//! [`WorkloadArgs::into_config`].

use crate::config::{
    ConfigError, WorkloadConfig, DEFAULT_COMPLETION_THRESHOLD, DEFAULT_RESOLVED_HISTORY, DEFAULT_URL,
};
use clap::Args;

/// Arguments of the `workload` command.
#[derive(Debug, Clone, Args)]
pub struct WorkloadArgs {
    /// Batch rate in batches per second. Should be greater than 0.
    #[arg(long, default_value = "10")]
    pub rate: u32,

    /// Time between display of batch rate updates (e.g. "30s", "1m").
    #[arg(short = 'd', long, default_value = "30s")]
    pub display_frequency: humantime::Duration,

    /// Comma separated URLs of nodes to connect to.
    #[arg(short, long, value_delimiter = ',', default_value = DEFAULT_URL)]
    pub urls: Vec<String>,

    /// Counter value at which a key chain is finished.
    #[arg(long, default_value_t = DEFAULT_COMPLETION_THRESHOLD)]
    pub completion_threshold: u64,

    /// Number of resolved batch ids remembered to ignore repeated commits.
    #[arg(long, default_value_t = DEFAULT_RESOLVED_HISTORY)]
    pub resolved_history: usize,

    /// Seed for connection selection.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl WorkloadArgs {
    /// Build a validated configuration.
    pub fn into_config(self) -> Result<WorkloadConfig, ConfigError> {
        let mut config = WorkloadConfig::new(self.urls)
            .with_rate(self.rate)
            .with_display_frequency(*self.display_frequency)
            .with_completion_threshold(self.completion_threshold)
            .with_resolved_history(self.resolved_history);
        config.seed = self.seed;
        config.validate()?;
        Ok(config)
    }
}
