//! Runtime configuration for the vanity key generator.

use std::time::Duration;

use clap::Parser;

use crate::matcher::{MatchRule, MatchRuleError};

/// Ed25519 Vanity Key Generator
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Base32 prefix to search for (A-Z, 2-7; case-insensitive)
    #[arg(short, long, default_value = "tor", conflicts_with = "regex")]
    pub prefix: String,

    /// Regular expression to match against the whole address (case-insensitive)
    #[arg(short = 'e', long)]
    pub regex: Option<String>,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Stop after finding N keys (0 = run until interrupted)
    #[arg(short = 'n', long, default_value = "0")]
    pub count: u64,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "1")]
    pub report_interval: u64,

    /// Include hit rates (per minute/hour/day/week) in success lines
    #[arg(long, default_value = "false")]
    pub rates: bool,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Returns the progress report interval.
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::InvalidWorkers);
        }

        if self.report_interval == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        Ok(())
    }

    /// Builds the match rule, compiling the pattern or normalizing the prefix.
    pub fn match_rule(&self) -> Result<MatchRule, ConfigError> {
        let rule = match self.regex {
            Some(ref pattern) => MatchRule::pattern(pattern)?,
            None => MatchRule::prefix(&self.prefix)?,
        };
        Ok(rule)
    }

    /// Returns true when the search should stop after a fixed number of hits.
    pub fn has_target(&self) -> bool {
        self.count > 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid match rule: {0}")]
    InvalidRule(#[from] MatchRuleError),

    #[error("Worker count must be at least 1")]
    InvalidWorkers,

    #[error("Report interval must be at least 1 second")]
    InvalidInterval,
}
