// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for reindex runs

use crate::adapters::{IndexError, TransactionError};
use crate::state::{RunInput, RunPhase};
use std::path::PathBuf;
use thiserror::Error;

/// Invalid or unreadable reindex configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reindexing requires at least 1 worker, found: {0}")]
    InvalidWorkerCount(usize),
    #[error("reindex batch size must be at least 1")]
    InvalidBatchSize,
    #[error("progress report interval must be non-zero")]
    InvalidReportInterval,
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failure while reindexing a single object
///
/// Absorbed by the worker and counted; only escapes a worker when the
/// transaction manager cannot hand out transactions at all.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("index error: {0}")]
    Index(#[from] IndexError),
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),
}

/// Errors that abort or reject a reindex run
#[derive(Debug, Error)]
pub enum ReindexError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A worker could not continue (coordination failure)
    #[error("worker {worker} failed: {source}")]
    Worker {
        worker: String,
        #[source]
        source: WorkerError,
    },
    /// A worker task panicked or was cancelled (coordination failure)
    #[error("worker task failed: {0}")]
    WorkerTask(#[from] tokio::task::JoinError),
    /// Membership indexing failed; its transaction was rolled back
    #[error("membership indexing failed: {0}")]
    Index(#[from] IndexError),
    /// The finalization transaction could not be created or committed
    #[error("finalization transaction failed: {0}")]
    Transaction(#[from] TransactionError),
    #[error("cannot apply {input:?} to a run that is {from}")]
    InvalidState { from: RunPhase, input: RunInput },
}

impl ReindexError {
    /// Whether this error escaped the worker-join phase
    pub fn is_coordination(&self) -> bool {
        matches!(self, ReindexError::Worker { .. } | ReindexError::WorkerTask(_))
    }
}
