//! Keyed lock table
//!
//! Hands out one mutex per string slot so that operations on the same
//! namespace name or the same key serialize, while unrelated slots proceed
//! in parallel. Only guards callers inside this process.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};

/// Held for as long as the slot must stay exclusive
pub type SlotGuard = ArcMutexGuard<RawMutex, ()>;

/// Slots are pruned once the table grows past this many entries
pub const PRUNE_THRESHOLD: usize = 1024;

/// Table of per-slot mutexes
#[derive(Debug, Default)]
pub struct LockTable {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `slot` is free and return its guard
    pub fn lock(&self, slot: &str) -> SlotGuard {
        let slot_mutex = {
            let mut slots = self.slots.lock();
            if slots.len() >= PRUNE_THRESHOLD {
                // Only the table itself references an idle slot
                slots.retain(|_, m| Arc::strong_count(m) > 1);
            }
            Arc::clone(slots.entry(slot.to_string()).or_default())
        };

        slot_mutex.lock_arc()
    }

    /// Number of slots currently tracked
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Slot name for one key inside one namespace
pub fn key_slot(namespace_id: &str, key: &str) -> String {
    format!("{}/{}", namespace_id, key)
}
