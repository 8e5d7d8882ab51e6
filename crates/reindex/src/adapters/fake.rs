// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake collaborators for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{IndexError, ReindexService, Transaction, TransactionError, TransactionManager};
use crate::source::IdSource;
use async_trait::async_trait;
use rx_core::TransactionId;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded state of a transaction handed out by [`FakeTransactionManager`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRecord {
    pub id: TransactionId,
    pub short_lived: bool,
    pub committed: bool,
    pub rolled_back: bool,
}

#[derive(Default)]
struct TxState {
    records: Vec<TxRecord>,
    fail_create: bool,
    fail_commit: bool,
}

/// Fake transaction manager recording every transaction it creates
#[derive(Clone, Default)]
pub struct FakeTransactionManager {
    state: Arc<Mutex<TxState>>,
}

impl FakeTransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `create` fail
    pub fn fail_create(&self) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_create = true;
    }

    /// Make every later `commit` fail
    pub fn fail_commit(&self) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_commit = true;
    }

    /// All transactions created so far, in creation order
    pub fn transactions(&self) -> Vec<TxRecord> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records
            .clone()
    }

    pub fn committed_count(&self) -> usize {
        self.transactions().iter().filter(|r| r.committed).count()
    }
}

#[async_trait]
impl TransactionManager for FakeTransactionManager {
    type Tx = FakeTransaction;

    async fn create(&self) -> Result<FakeTransaction, TransactionError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_create {
            return Err(TransactionError::CreateFailed(
                "injected create failure".to_string(),
            ));
        }
        let index = state.records.len();
        let id = TransactionId::new(format!("tx-{}", index + 1));
        state.records.push(TxRecord {
            id: id.clone(),
            short_lived: false,
            committed: false,
            rolled_back: false,
        });
        Ok(FakeTransaction {
            index,
            id,
            state: Arc::clone(&self.state),
        })
    }
}

/// Transaction handed out by [`FakeTransactionManager`]
pub struct FakeTransaction {
    index: usize,
    id: TransactionId,
    state: Arc<Mutex<TxState>>,
}

impl FakeTransaction {
    fn update(&self, f: impl FnOnce(&mut TxRecord)) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(record) = state.records.get_mut(self.index) {
            f(record);
        }
    }
}

#[async_trait]
impl Transaction for FakeTransaction {
    fn id(&self) -> &TransactionId {
        &self.id
    }

    fn mark_short_lived(&self) {
        self.update(|record| record.short_lived = true);
    }

    async fn commit(&self) -> Result<(), TransactionError> {
        let fail = self
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fail_commit;
        if fail {
            return Err(TransactionError::CommitFailed {
                tx: self.id.clone(),
                message: "injected commit failure".to_string(),
            });
        }
        self.update(|record| record.committed = true);
        Ok(())
    }

    async fn rollback(&self) -> Result<(), TransactionError> {
        self.update(|record| record.rolled_back = true);
        Ok(())
    }
}

/// Recorded call to [`FakeReindexService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCall {
    Object { tx: TransactionId, id: String },
    Membership { tx: TransactionId },
}

#[derive(Default)]
struct IndexState {
    calls: Vec<IndexCall>,
    failing: HashSet<String>,
    fail_membership: bool,
    delay: Option<Duration>,
}

/// Fake reindex service recording calls, with injectable failures
#[derive(Clone, Default)]
pub struct FakeReindexService {
    state: Arc<Mutex<IndexState>>,
}

impl FakeReindexService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every `index_object` call
    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).delay = Some(delay);
        self
    }

    /// Fail `index_object` for this id
    pub fn fail_on(&self, id: impl Into<String>) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .failing
            .insert(id.into());
    }

    /// Fail every `index_membership` call
    pub fn fail_membership(&self) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fail_membership = true;
    }

    /// All recorded calls, in call order
    pub fn calls(&self) -> Vec<IndexCall> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    /// Ids passed to `index_object`, failed ones included
    pub fn indexed_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                IndexCall::Object { id, .. } => Some(id),
                IndexCall::Membership { .. } => None,
            })
            .collect()
    }

    pub fn membership_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, IndexCall::Membership { .. }))
            .count()
    }
}

#[async_trait]
impl ReindexService for FakeReindexService {
    async fn index_object(&self, tx: &dyn Transaction, id: &str) -> Result<(), IndexError> {
        let delay = self.state.lock().unwrap_or_else(|e| e.into_inner()).delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(IndexCall::Object {
            tx: tx.id().clone(),
            id: id.to_string(),
        });
        if state.failing.contains(id) {
            return Err(IndexError::ObjectFailed {
                id: id.to_string(),
                message: "injected index failure".to_string(),
            });
        }
        Ok(())
    }

    async fn index_membership(&self, tx: &dyn Transaction) -> Result<(), IndexError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(IndexCall::Membership {
            tx: tx.id().clone(),
        });
        if state.fail_membership {
            return Err(IndexError::MembershipFailed(
                "injected membership failure".to_string(),
            ));
        }
        Ok(())
    }
}

/// Observes pulls and closes on a [`FakeIdSource`] after it has been moved into a run
#[derive(Clone, Debug, Default)]
pub struct SourceProbe {
    pulled: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl SourceProbe {
    /// Number of ids handed out so far
    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }

    /// Number of times `close` was called
    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

/// In-memory id source
pub struct FakeIdSource {
    ids: VecDeque<String>,
    probe: SourceProbe,
}

impl FakeIdSource {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            probe: SourceProbe::default(),
        }
    }

    /// Source yielding "1" through "n"
    pub fn numbered(n: usize) -> Self {
        Self::new((1..=n).map(|i| i.to_string()))
    }

    pub fn probe(&self) -> SourceProbe {
        self.probe.clone()
    }
}

impl IdSource for FakeIdSource {
    fn next_id(&mut self) -> Option<String> {
        let id = self.ids.pop_front()?;
        self.probe.pulled.fetch_add(1, Ordering::SeqCst);
        Some(id)
    }

    fn close(&mut self) {
        self.probe.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
