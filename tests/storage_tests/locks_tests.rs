//! Tests for LockTable
//!
//! These tests verify:
//! - Holders of one slot are mutually exclusive
//! - Distinct slots are independent
//! - Idle slots are pruned once the table grows

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use nskv::storage::{key_slot, LockTable, PRUNE_THRESHOLD};

#[test]
fn test_same_slot_serializes() {
    let table = Arc::new(LockTable::new());
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let table = Arc::clone(&table);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            thread::spawn(move || {
                for _ in 0..50 {
                    let _guard = table.lock("ns/key");
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    inside.fetch_sub(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
}

#[test]
fn test_distinct_slots_do_not_block() {
    let table = LockTable::new();
    assert!(table.is_empty());

    let _a = table.lock("a");
    let _b = table.lock("b");

    assert_eq!(table.len(), 2);
}

#[test]
fn test_idle_slots_are_pruned() {
    let table = LockTable::new();
    for i in 0..PRUNE_THRESHOLD {
        drop(table.lock(&format!("slot-{}", i)));
    }

    let _guard = table.lock("fresh");

    assert_eq!(table.len(), 1);
}

#[test]
fn test_held_slots_survive_pruning() {
    let table = LockTable::new();
    let _held = table.lock("held");
    for i in 0..PRUNE_THRESHOLD - 1 {
        drop(table.lock(&format!("slot-{}", i)));
    }

    let _guard = table.lock("fresh");

    assert_eq!(table.len(), 2);
}

#[test]
fn test_key_slot_format() {
    assert_eq!(key_slot("ns", "k"), "ns/k");
}
