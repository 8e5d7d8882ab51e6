// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborators a reindex run drives
//!
//! The object store, per-object indexing and transaction commit all live behind
//! these traits. A run only sequences calls to them.

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{
    FakeIdSource, FakeReindexService, FakeTransaction, FakeTransactionManager, IndexCall,
    SourceProbe, TxRecord,
};

use async_trait::async_trait;
use rx_core::TransactionId;
use thiserror::Error;

/// Errors from transaction operations
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("failed to create transaction: {0}")]
    CreateFailed(String),
    #[error("failed to commit transaction {tx}: {message}")]
    CommitFailed { tx: TransactionId, message: String },
    #[error("failed to roll back transaction {tx}: {message}")]
    RollbackFailed { tx: TransactionId, message: String },
}

/// Errors from index operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to index object {id}: {message}")]
    ObjectFailed { id: String, message: String },
    #[error("failed to index membership: {0}")]
    MembershipFailed(String),
}

/// A unit of isolation with its own commit lifecycle
#[async_trait]
pub trait Transaction: Send + Sync {
    fn id(&self) -> &TransactionId;

    /// Flag the transaction as short-lived so it expires quickly if abandoned
    fn mark_short_lived(&self);

    async fn commit(&self) -> Result<(), TransactionError>;

    async fn rollback(&self) -> Result<(), TransactionError>;
}

/// Creates transactions
#[async_trait]
pub trait TransactionManager: Clone + Send + Sync + 'static {
    type Tx: Transaction + 'static;

    async fn create(&self) -> Result<Self::Tx, TransactionError>;
}

/// Rebuilds derived index rows from the canonical object store
///
/// Assumed idempotent: rerunning a whole run from scratch is safe.
#[async_trait]
pub trait ReindexService: Clone + Send + Sync + 'static {
    /// Reindex one stored object within `tx`
    async fn index_object(&self, tx: &dyn Transaction, id: &str) -> Result<(), IndexError>;

    /// Compute and persist containment relationships across all reindexed resources
    async fn index_membership(&self, tx: &dyn Transaction) -> Result<(), IndexError>;
}
