// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource lock service for single-writer-per-resource semantics
//!
//! Maps each locked resource to the transaction holding it. A transaction may
//! re-acquire a resource it already holds; any other transaction is refused with
//! [`LockError::Conflict`] naming the holder. Conflicts are reported immediately,
//! there is no waiting or retry.

use crate::id::{ResourceId, TransactionId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

/// Errors from lock acquisition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("resource {resource} is locked by transaction {holder}")]
    Conflict {
        resource: ResourceId,
        holder: TransactionId,
    },
}

impl LockError {
    /// The transaction currently holding the contested resource
    pub fn holder(&self) -> &TransactionId {
        match self {
            LockError::Conflict { holder, .. } => holder,
        }
    }
}

/// In-memory registry of resource locks shared by every transaction in the process
///
/// Construct one per process and share it behind an `Arc`. Each check-and-set runs
/// under the shard lock of a single key, so unrelated resources never contend.
#[derive(Debug, Default)]
pub struct ResourceLockManager {
    /// Locked resource -> holding transaction. Absence means unlocked.
    locks: DashMap<ResourceId, TransactionId>,
}

impl ResourceLockManager {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Lock `resource` for `tx`
    ///
    /// Succeeds when the resource is free or already held by `tx`. Fails without
    /// changing any state when another transaction holds it.
    pub fn acquire(&self, tx: &TransactionId, resource: &ResourceId) -> Result<(), LockError> {
        match self.locks.entry(resource.clone()) {
            Entry::Vacant(vacant) => {
                vacant.insert(tx.clone());
                tracing::debug!(tx = %tx, resource = %resource, "lock acquired");
                Ok(())
            }
            Entry::Occupied(occupied) if occupied.get() == tx => Ok(()),
            Entry::Occupied(occupied) => {
                let holder = occupied.get().clone();
                tracing::debug!(tx = %tx, resource = %resource, holder = %holder, "lock denied");
                Err(LockError::Conflict {
                    resource: resource.clone(),
                    holder,
                })
            }
        }
    }

    /// Release every lock held by `tx`
    ///
    /// Visits each shard once, removing only entries owned by `tx`. Releasing a
    /// transaction that holds nothing is a no-op.
    pub fn release_all(&self, tx: &TransactionId) {
        let mut released = 0usize;
        self.locks.retain(|_, holder| {
            if holder == tx {
                released += 1;
                false
            } else {
                true
            }
        });
        tracing::debug!(tx = %tx, released, "locks released");
    }

    /// Transaction currently holding `resource`, if any
    pub fn holder(&self, resource: &ResourceId) -> Option<TransactionId> {
        self.locks.get(resource).map(|entry| entry.value().clone())
    }

    pub fn is_locked(&self, resource: &ResourceId) -> bool {
        self.locks.contains_key(resource)
    }

    /// Resources currently held by `tx`, in no particular order
    pub fn held_by(&self, tx: &TransactionId) -> Vec<ResourceId> {
        self.locks
            .iter()
            .filter(|entry| entry.value() == tx)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Number of locked resources
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
