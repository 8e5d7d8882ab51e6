// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background progress reporter for a reindex run

use crate::run::RunContext;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Point-in-time view of run progress
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub completed: u64,
    pub errored: u64,
    pub elapsed: Duration,
}

impl Progress {
    pub fn sample(run: &RunContext, elapsed: Duration) -> Self {
        Self {
            completed: run.completed_count(),
            errored: run.error_count(),
            elapsed,
        }
    }

    /// Items per second over whole elapsed seconds
    pub fn rate(&self) -> u64 {
        progress_rate(self.completed + self.errored, self.elapsed)
    }
}

/// Items per second, or 0 while less than a whole second has elapsed
pub fn progress_rate(total: u64, elapsed: Duration) -> u64 {
    total.checked_div(elapsed.as_secs()).unwrap_or(0)
}

/// Elapsed time at whole-second precision, e.g. "1h 2m 5s"
pub fn format_elapsed(elapsed: Duration) -> String {
    humantime::format_duration(Duration::from_secs(elapsed.as_secs())).to_string()
}

/// Handle to a running reporter task
///
/// Dropping the handle signals the task to stop; [`Reporter::stop`] also waits
/// for it to exit.
pub struct Reporter {
    cancel: CancellationToken,
    reports: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl Reporter {
    /// Spawn a task logging progress every `interval`, first after one full interval
    pub fn spawn(run: Arc<RunContext>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let reports = Arc::new(AtomicU64::new(0));
        let handle = tokio::spawn(report_loop(
            run,
            interval,
            cancel.clone(),
            Arc::clone(&reports),
        ));
        Self {
            cancel,
            reports,
            handle: Some(handle),
        }
    }

    /// Number of progress lines logged so far
    pub fn reports(&self) -> u64 {
        self.reports.load(Ordering::SeqCst)
    }

    /// Signal the task and wait for it to exit. Returns the number of reports logged.
    pub async fn stop(mut self) -> u64 {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "progress reporter task failed");
            }
        }
        self.reports()
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn report_loop(
    run: Arc<RunContext>,
    interval: Duration,
    cancel: CancellationToken,
    reports: Arc<AtomicU64>,
) {
    let started = Instant::now();
    let mut ticker = interval_at(started + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let progress = Progress::sample(&run, started.elapsed());
                tracing::info!(
                    completed = progress.completed,
                    errored = progress.errored,
                    elapsed = %format_elapsed(progress.elapsed),
                    rate_per_sec = progress.rate(),
                    "index rebuild progress"
                );
                reports.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

#[cfg(test)]
#[path = "reporter_tests.rs"]
mod tests;
