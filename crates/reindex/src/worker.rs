// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reindex worker: pulls batches from the run and reindexes each id

use crate::adapters::{ReindexService, Transaction, TransactionManager};
use crate::error::WorkerError;
use crate::run::RunContext;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Totals a worker contributed over its lifetime
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub batches: u64,
    pub completed: u64,
    pub errored: u64,
}

/// A worker bound to one run
///
/// Loops until it receives an empty batch or observes cancellation at a batch
/// boundary. A failing id is rolled back, logged and counted; it never ends
/// the loop.
#[derive(Clone)]
pub struct ReindexWorker<S, T> {
    name: String,
    run: Arc<RunContext>,
    service: S,
    tx_manager: T,
    cancel: CancellationToken,
}

impl<S: ReindexService, T: TransactionManager> ReindexWorker<S, T> {
    pub fn new(
        name: impl Into<String>,
        run: Arc<RunContext>,
        service: S,
        tx_manager: T,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            name: name.into(),
            run,
            service,
            tx_manager,
            cancel,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Request a stop; honored before the next batch is pulled
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Pull and process batches until the source is drained or the worker is stopped
    ///
    /// Returns an error only when no transaction can be created, after reporting
    /// the partial batch.
    pub async fn run(self) -> Result<WorkerReport, WorkerError> {
        let mut report = WorkerReport::default();
        tracing::debug!(worker = %self.name, "worker started");

        loop {
            if self.is_stopped() {
                tracing::debug!(worker = %self.name, "stop requested");
                break;
            }
            let ids = self.run.get_ids();
            if ids.is_empty() {
                break;
            }

            let mut completed = 0u64;
            let mut errored = 0u64;
            let mut failure = None;
            for id in &ids {
                match self.process(id).await {
                    Ok(true) => completed += 1,
                    Ok(false) => errored += 1,
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            self.run.update_complete(completed, errored);
            report.batches += 1;
            report.completed += completed;
            report.errored += errored;

            if let Some(e) = failure {
                tracing::error!(worker = %self.name, error = %e, "worker cannot continue");
                return Err(e);
            }
        }

        tracing::debug!(
            worker = %self.name,
            batches = report.batches,
            completed = report.completed,
            errored = report.errored,
            "worker finished"
        );
        Ok(report)
    }

    /// Reindex one id in its own short-lived transaction
    ///
    /// `Ok(false)` means the id failed and was rolled back.
    async fn process(&self, id: &str) -> Result<bool, WorkerError> {
        let tx = self.tx_manager.create().await?;
        tx.mark_short_lived();

        match self.reindex(&tx, id).await {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::error!(worker = %self.name, id, error = %e, "reindexing failed");
                if let Err(e) = tx.rollback().await {
                    tracing::warn!(worker = %self.name, id, error = %e, "rollback failed");
                }
                Ok(false)
            }
        }
    }

    async fn reindex(&self, tx: &T::Tx, id: &str) -> Result<(), WorkerError> {
        self.service.index_object(tx, id).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
