// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_tx_manager_records_lifecycle() {
    let manager = FakeTransactionManager::new();

    let tx = manager.create().await.unwrap();
    tx.mark_short_lived();
    tx.commit().await.unwrap();
    let other = manager.create().await.unwrap();
    other.rollback().await.unwrap();

    let records = manager.transactions();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, TransactionId::new("tx-1"));
    assert!(records[0].short_lived);
    assert!(records[0].committed);
    assert!(records[1].rolled_back);
    assert!(!records[1].committed);
    assert_eq!(manager.committed_count(), 1);
}

#[tokio::test]
async fn fake_tx_manager_injects_failures() {
    let manager = FakeTransactionManager::new();
    let tx = manager.create().await.unwrap();

    manager.fail_commit();
    assert!(matches!(
        tx.commit().await,
        Err(TransactionError::CommitFailed { .. })
    ));

    manager.fail_create();
    assert!(matches!(
        manager.create().await,
        Err(TransactionError::CreateFailed(_))
    ));
}

#[tokio::test]
async fn fake_service_records_calls_and_fails_on_request() {
    let service = FakeReindexService::new();
    let manager = FakeTransactionManager::new();
    let tx = manager.create().await.unwrap();
    service.fail_on("bad");

    service.index_object(&tx, "good").await.unwrap();
    assert!(service.index_object(&tx, "bad").await.is_err());
    service.index_membership(&tx).await.unwrap();

    assert_eq!(service.indexed_ids(), vec!["good", "bad"]);
    assert_eq!(service.membership_calls(), 1);
    assert_eq!(
        service.calls().last(),
        Some(&IndexCall::Membership {
            tx: TransactionId::new("tx-1")
        })
    );
}

#[test]
fn fake_source_counts_pulls_and_closes() {
    let mut source = FakeIdSource::numbered(2);
    let probe = source.probe();

    assert_eq!(source.next_id().as_deref(), Some("1"));
    assert_eq!(source.next_id().as_deref(), Some("2"));
    assert_eq!(source.next_id(), None);
    source.close();

    assert_eq!(probe.pulled(), 2);
    assert!(probe.is_closed());
}
