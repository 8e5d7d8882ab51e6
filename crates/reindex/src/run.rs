// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State shared by a run's coordinator, workers and progress reporter

use crate::source::IdCursor;
use std::sync::atomic::{AtomicU64, Ordering};

/// Id cursor plus the run's running totals
#[derive(Debug)]
pub struct RunContext {
    cursor: IdCursor,
    batch_size: usize,
    completed: AtomicU64,
    errored: AtomicU64,
}

impl RunContext {
    pub fn new(cursor: IdCursor, batch_size: usize) -> Self {
        Self {
            cursor,
            batch_size,
            completed: AtomicU64::new(0),
            errored: AtomicU64::new(0),
        }
    }

    /// Next batch of up to `batch_size` ids; empty when the source is drained
    pub fn get_ids(&self) -> Vec<String> {
        self.cursor.next_batch(self.batch_size)
    }

    /// Add one batch's results to the running totals
    pub fn update_complete(&self, completed: u64, errored: u64) {
        // Totals are only read as snapshots; joining the workers orders the final read.
        self.completed.fetch_add(completed, Ordering::Relaxed);
        self.errored.fetch_add(errored, Ordering::Relaxed);
    }

    pub fn completed_count(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.errored.load(Ordering::Relaxed)
    }

    pub(crate) fn close_source(&self) -> bool {
        self.cursor.close()
    }
}
