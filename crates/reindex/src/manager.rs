// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reindex coordinator
//!
//! Owns the id cursor, the worker pool and the run totals. A run goes:
//! start the reporter, run every worker to completion, then finalize with a
//! single membership-indexing transaction unless the failure policy says
//! otherwise. The reporter is stopped on every exit path.

use crate::adapters::{ReindexService, Transaction, TransactionError, TransactionManager};
use crate::config::ReindexConfig;
use crate::error::ReindexError;
use crate::reporter::Reporter;
use crate::run::RunContext;
use crate::source::{IdCursor, IdSource};
use crate::state::{RunInput, RunPhase};
use crate::worker::ReindexWorker;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// How a run that reached the join point ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Membership indexing ran and committed
    Finalized,
    /// Errors under fail-on-error policy; membership indexing skipped
    Incomplete,
}

/// Final totals of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: u64,
    pub errored: u64,
    pub outcome: RunOutcome,
    pub elapsed: Duration,
}

/// Coordinates one reindex run over a bounded pool of workers
pub struct ReindexManager<S: ReindexService, T: TransactionManager> {
    run: Arc<RunContext>,
    service: S,
    tx_manager: T,
    config: ReindexConfig,
    workers: Vec<ReindexWorker<S, T>>,
    cancel: CancellationToken,
    phase: Mutex<RunPhase>,
    finalization: OnceCell<T::Tx>,
}

impl<S: ReindexService, T: TransactionManager> ReindexManager<S, T> {
    /// Build a run and its workers without starting anything
    pub fn new(
        source: impl IdSource + 'static,
        service: S,
        tx_manager: T,
        config: ReindexConfig,
    ) -> Result<Self, ReindexError> {
        config.validate()?;

        let run = Arc::new(RunContext::new(IdCursor::new(source), config.batch_size));
        let cancel = CancellationToken::new();
        let workers = (0..config.workers)
            .map(|i| {
                ReindexWorker::new(
                    format!("reindex-worker-{i}"),
                    Arc::clone(&run),
                    service.clone(),
                    tx_manager.clone(),
                    cancel.child_token(),
                )
            })
            .collect();

        Ok(Self {
            run,
            service,
            tx_manager,
            config,
            workers,
            cancel,
            phase: Mutex::new(RunPhase::Created),
            finalization: OnceCell::new(),
        })
    }

    /// Run every worker to completion, then finalize per the failure policy
    ///
    /// Blocks until all workers have exited. A worker failure stops the rest
    /// and is returned once they have drained.
    pub async fn start(&self) -> Result<RunSummary, ReindexError> {
        self.advance(RunInput::Start)?;
        let mut abandoned = AbortOnDrop {
            manager: self,
            armed: true,
        };
        let started = Instant::now();
        tracing::info!(
            workers = self.workers.len(),
            batch_size = self.config.batch_size,
            fail_on_error = self.config.fail_on_error,
            "starting index rebuild"
        );

        let reporter = Reporter::spawn(Arc::clone(&self.run), self.config.report_interval);
        let result = match self.join_workers().await {
            Ok(()) => self.finish().await,
            Err(e) => {
                tracing::error!(error = %e, "error while rebuilding index");
                Err(e)
            }
        };
        reporter.stop().await;
        abandoned.armed = false;

        match result {
            Ok(outcome) => Ok(RunSummary {
                completed: self.completed_count(),
                errored: self.error_count(),
                outcome,
                elapsed: started.elapsed(),
            }),
            Err(e) => {
                if let Err(invalid) = self.advance(RunInput::Abort) {
                    tracing::warn!(error = %invalid, "could not mark run aborted");
                }
                Err(e)
            }
        }
    }

    /// Ask every worker to stop at its next batch boundary
    pub fn stop(&self) {
        tracing::debug!("stop worker tasks");
        self.cancel.cancel();
    }

    /// Next batch of ids for a worker; empty once the source is drained
    pub fn get_ids(&self) -> Vec<String> {
        self.run.get_ids()
    }

    /// Add one batch's results to the run totals
    pub fn update_complete(&self, completed: u64, errored: u64) {
        self.run.update_complete(completed, errored);
    }

    pub fn completed_count(&self) -> u64 {
        self.run.completed_count()
    }

    pub fn error_count(&self) -> u64 {
        self.run.error_count()
    }

    pub fn phase(&self) -> RunPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Release the id source. The run must be finished or never started.
    pub fn shutdown(self) -> Result<(), ReindexError> {
        self.advance(RunInput::Shutdown)?;
        if self.run.close_source() {
            tracing::debug!("reindex id source closed");
        }
        Ok(())
    }

    fn advance(&self, input: RunInput) -> Result<RunPhase, ReindexError> {
        let mut phase = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        let next = phase.transition(input)?;
        *phase = next;
        Ok(next)
    }

    /// Spawn every worker and wait for all of them, stopping the rest on first failure
    async fn join_workers(&self) -> Result<(), ReindexError> {
        let mut tasks = JoinSet::new();
        for worker in &self.workers {
            let worker = worker.clone();
            tasks.spawn(async move {
                let name = worker.name().to_string();
                (name, worker.run().await)
            });
        }

        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            let err = match joined {
                Ok((name, Ok(report))) => {
                    tracing::debug!(
                        worker = %name,
                        completed = report.completed,
                        errored = report.errored,
                        "worker joined"
                    );
                    continue;
                }
                Ok((worker, Err(source))) => ReindexError::Worker { worker, source },
                Err(e) => ReindexError::WorkerTask(e),
            };
            if failure.is_none() {
                self.stop();
                failure = Some(err);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn finish(&self) -> Result<RunOutcome, ReindexError> {
        if !self.config.fail_on_error || self.error_count() == 0 {
            self.index_membership().await?;
            self.advance(RunInput::Finalize)?;
            Ok(RunOutcome::Finalized)
        } else {
            tracing::error!(
                completed = self.completed_count(),
                errored = self.error_count(),
                "reindex did not complete successfully"
            );
            self.advance(RunInput::SkipFinalize)?;
            Ok(RunOutcome::Incomplete)
        }
    }

    /// Index membership relationships in one short-lived transaction
    async fn index_membership(&self) -> Result<(), ReindexError> {
        let tx = self
            .finalization
            .get_or_try_init(|| async {
                let tx = self.tx_manager.create().await?;
                tx.mark_short_lived();
                Ok::<_, TransactionError>(tx)
            })
            .await?;

        tracing::info!(tx = %tx.id(), "starting membership indexing");
        if let Err(e) = self.service.index_membership(tx).await {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(tx = %tx.id(), error = %rollback, "rollback failed");
            }
            return Err(e.into());
        }
        tx.commit().await?;
        tracing::debug!(tx = %tx.id(), "completed membership indexing");
        Ok(())
    }
}

/// Marks a run aborted if the `start` future is dropped before it finishes
struct AbortOnDrop<'a, S: ReindexService, T: TransactionManager> {
    manager: &'a ReindexManager<S, T>,
    armed: bool,
}

impl<S: ReindexService, T: TransactionManager> Drop for AbortOnDrop<'_, S, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.manager.stop();
        match self.manager.advance(RunInput::Abort) {
            Ok(_) => tracing::warn!("index rebuild abandoned before workers joined"),
            Err(e) => tracing::warn!(error = %e, "could not mark abandoned run aborted"),
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
