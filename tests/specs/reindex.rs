//! Reindex run behavior

use crate::prelude::{config, Run};
use rx_reindex::{ConfigError, FakeIdSource, ReindexError, RunOutcome, RunPhase};
use similar_asserts::assert_eq;
use std::collections::HashSet;

/// Scenario A: empty source, two workers
#[tokio::test]
async fn empty_source_finalizes_once() {
    let run = Run::build(FakeIdSource::numbered(0), config(2, 100, true)).unwrap();

    let summary = run.manager.start().await.unwrap();

    assert_eq!(summary.completed, 0);
    assert_eq!(summary.errored, 0);
    assert_eq!(summary.outcome, RunOutcome::Finalized);
    assert_eq!(run.service.membership_calls(), 1);
}

/// Scenario B: zero workers
#[test]
fn zero_workers_is_a_configuration_error() {
    let err = Run::build(FakeIdSource::numbered(3), config(0, 100, true))
        .err()
        .unwrap();

    assert!(matches!(
        err,
        ReindexError::Config(ConfigError::InvalidWorkerCount(0))
    ));
}

/// Scenario D: ten ids, batches of three, two workers
#[test]
fn ids_are_partitioned_into_bounded_batches() {
    let run = Run::build(FakeIdSource::numbered(10), config(2, 3, true)).unwrap();
    let manager = &run.manager;

    let batches: Vec<Vec<String>> = std::thread::scope(|scope| {
        let pullers: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(|| {
                    std::iter::from_fn(|| Some(manager.get_ids()).filter(|ids| !ids.is_empty()))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        pullers
            .into_iter()
            .flat_map(|p| p.join().unwrap())
            .collect()
    });

    assert!(batches.iter().all(|batch| batch.len() <= 3));
    let ids: Vec<&String> = batches.iter().flatten().collect();
    let unique: HashSet<&String> = ids.iter().copied().collect();
    assert_eq!(ids.len(), 10);
    assert_eq!(unique.len(), 10);
}

/// Scenario D, end to end
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_indexes_every_id_once() {
    let run = Run::build(FakeIdSource::numbered(10), config(2, 3, true)).unwrap();

    let summary = run.manager.start().await.unwrap();

    assert_eq!(summary.completed, 10);
    let mut indexed: Vec<u32> = run
        .service
        .indexed_ids()
        .iter()
        .map(|id| id.parse().unwrap())
        .collect();
    indexed.sort_unstable();
    assert_eq!(indexed, (1..=10u32).collect::<Vec<_>>());
}

/// Scenario E: one failure under fail-on-error
#[tokio::test]
async fn failure_under_fail_on_error_skips_finalization() {
    let run = Run::build(FakeIdSource::numbered(10), config(1, 10, true)).unwrap();
    run.service.fail_on("5");

    let summary = run.manager.start().await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Incomplete);
    assert_eq!(run.manager.error_count(), 1);
    assert_eq!(run.manager.completed_count(), 9);
    assert_eq!(run.service.membership_calls(), 0);
    assert_eq!(run.manager.phase(), RunPhase::Incomplete);
}

#[tokio::test]
async fn failures_without_fail_on_error_still_finalize() {
    let run = Run::build(FakeIdSource::numbered(10), config(3, 2, false)).unwrap();
    run.service.fail_on("1");
    run.service.fail_on("9");

    let summary = run.manager.start().await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Finalized);
    assert_eq!(summary.errored, 2);
    assert_eq!(summary.completed, 8);
    assert_eq!(run.service.membership_calls(), 1);
}

#[tokio::test]
async fn full_lifecycle_ends_closed_with_source_released() {
    let source = FakeIdSource::numbered(6);
    let probe = source.probe();
    let run = Run::build(source, config(2, 4, true)).unwrap();
    assert_eq!(run.manager.phase(), RunPhase::Created);

    run.manager.start().await.unwrap();
    assert_eq!(run.manager.phase(), RunPhase::Finalized);
    assert_eq!(run.tx_manager.committed_count(), 7);

    run.manager.shutdown().unwrap();
    assert_eq!(probe.pulled(), 6);
    assert!(probe.is_closed());
}
