// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reindex run configuration
//!
//! Loaded from TOML; every key is optional:
//!
//! ```toml
//! batch_size = 100
//! workers = 4
//! fail_on_error = true
//! report_interval = "5m"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_BATCH_SIZE: usize = 100;
const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(300);

/// Batching, parallelism and failure policy for a reindex run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReindexConfig {
    /// Ids handed to a worker per pull
    pub batch_size: usize,
    /// Number of concurrent workers
    pub workers: usize,
    /// Skip membership indexing when any object failed
    pub fail_on_error: bool,
    /// Time between progress log lines
    #[serde(with = "humantime_serde")]
    pub report_interval: Duration,
}

impl Default for ReindexConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            workers: default_workers(),
            fail_on_error: true,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

/// One fewer than the available cores, never below one
fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

impl ReindexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ReindexConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers < 1 {
            return Err(ConfigError::InvalidWorkerCount(self.workers));
        }
        if self.batch_size < 1 {
            return Err(ConfigError::InvalidBatchSize);
        }
        if self.report_interval.is_zero() {
            return Err(ConfigError::InvalidReportInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
