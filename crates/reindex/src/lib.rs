// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! rx-reindex: Rebuilds derived indexes from the canonical object store
//!
//! A [`ReindexManager`] hands batches of object ids to a pool of workers,
//! tallies per-item successes and failures, reports progress in the
//! background, and finishes with a single membership-indexing transaction.

pub mod adapters;
pub mod config;
mod error;
mod manager;
pub mod reporter;
mod run;
pub mod source;
mod state;
mod worker;

pub use adapters::{IndexError, ReindexService, Transaction, TransactionError, TransactionManager};
pub use config::ReindexConfig;
pub use error::{ConfigError, ReindexError, WorkerError};
pub use manager::{ReindexManager, RunOutcome, RunSummary};
pub use reporter::{Progress, Reporter};
pub use run::RunContext;
pub use source::{IdCursor, IdSource, IterSource};
pub use state::{RunInput, RunPhase};
pub use worker::{ReindexWorker, WorkerReport};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use adapters::{
    FakeIdSource, FakeReindexService, FakeTransaction, FakeTransactionManager, IndexCall,
    SourceProbe, TxRecord,
};
