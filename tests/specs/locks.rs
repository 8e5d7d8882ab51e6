//! Resource lock service behavior

use rx_core::{LockError, ResourceId, ResourceLockManager, TransactionId};
use std::sync::{Arc, Barrier};

#[test]
fn holder_blocks_other_transactions_until_released() {
    let locks = ResourceLockManager::new();
    let a = TransactionId::new("tx-A");
    let b = TransactionId::new("tx-B");
    let r = ResourceId::new("urn:1");

    locks.acquire(&a, &r).unwrap();
    let LockError::Conflict { holder, resource } = locks.acquire(&b, &r).unwrap_err();
    assert_eq!(holder, a);
    assert_eq!(resource, r);

    locks.release_all(&a);
    locks.acquire(&b, &r).unwrap();
}

#[test]
fn reacquire_by_holder_is_idempotent() {
    let locks = ResourceLockManager::new();
    let a = TransactionId::random();
    let r = ResourceId::new("urn:1");

    for _ in 0..5 {
        locks.acquire(&a, &r).unwrap();
    }

    assert_eq!(locks.len(), 1);
}

#[test]
fn release_all_twice_equals_once() {
    let locks = ResourceLockManager::new();
    let a = TransactionId::new("tx-A");
    locks.acquire(&a, &ResourceId::new("urn:1")).unwrap();
    locks.acquire(&a, &ResourceId::new("urn:2")).unwrap();

    locks.release_all(&a);
    locks.release_all(&a);

    assert!(locks.is_empty());
}

/// Scenario C: two transactions race for an unlocked resource
#[test]
fn racing_transactions_produce_exactly_one_winner() {
    for trial in 0..500 {
        let locks = Arc::new(ResourceLockManager::new());
        let barrier = Arc::new(Barrier::new(2));

        let racers: Vec<_> = ["tx-A", "tx-B"]
            .into_iter()
            .map(|tx| {
                let locks = Arc::clone(&locks);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    locks
                        .acquire(&TransactionId::new(tx), &ResourceId::new("urn:1"))
                        .is_ok()
                })
            })
            .collect();
        let results: Vec<bool> = racers.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(
            results == [true, false] || results == [false, true],
            "trial {trial}: expected exactly one winner, got {results:?}"
        );
    }
}

#[test]
fn same_transaction_concurrent_acquires_all_succeed() {
    let locks = Arc::new(ResourceLockManager::new());
    let barrier = Arc::new(Barrier::new(8));
    let a = TransactionId::new("tx-A");

    let callers: Vec<_> = (0..8)
        .map(|_| {
            let locks = Arc::clone(&locks);
            let barrier = Arc::clone(&barrier);
            let a = a.clone();
            std::thread::spawn(move || {
                barrier.wait();
                locks.acquire(&a, &ResourceId::new("urn:1"))
            })
        })
        .collect();

    for caller in callers {
        caller.join().unwrap().unwrap();
    }
    assert_eq!(locks.holder(&ResourceId::new("urn:1")), Some(a));
}
