// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-identity mutual exclusion.
//
// Artifact names are derived from the document id, so two runs for the same
// id would otherwise write the same `unsigned_<id>.pdf` and `<id>.pdf`. Runs
// for different ids never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use docseal_core::types::DocumentId;
use tracing::trace;

#[derive(Debug, Default)]
pub struct IdentityLocks {
    slots: Mutex<HashMap<DocumentId, Arc<Mutex<()>>>>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `id`.
    ///
    /// A panic in an earlier holder does not poison the slot; the guarded
    /// state is the filesystem, which every run rewrites from scratch.
    pub fn with_lock<T>(&self, id: DocumentId, f: impl FnOnce() -> T) -> T {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(id).or_default())
        };

        let result = {
            let _held = slot.lock().unwrap_or_else(PoisonError::into_inner);
            trace!(id = %id, "identity lock acquired");
            f()
        };

        self.release(id, slot);
        result
    }

    /// Drop the slot for `id` once nobody else holds or waits on it.
    fn release(&self, id: DocumentId, slot: Arc<Mutex<()>>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one in `slot`.
        if Arc::strong_count(&slot) == 2 {
            slots.remove(&id);
        }
    }

    /// Number of identities currently tracked.
    pub fn tracked(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn same_identity_is_serialized() {
        let locks = Arc::new(IdentityLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let (locks, inside, max_inside) =
                    (Arc::clone(&locks), Arc::clone(&inside), Arc::clone(&max_inside));
                std::thread::spawn(move || {
                    locks.with_lock(DocumentId(1), || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(20));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn different_identities_do_not_block_each_other() {
        let locks = IdentityLocks::new();
        let nested = locks.with_lock(DocumentId(3), || locks.with_lock(DocumentId(4), || 7));
        assert_eq!(nested, 7);
    }

    #[test]
    fn slots_are_released_after_use() {
        let locks = IdentityLocks::new();
        locks.with_lock(DocumentId(9), || ());
        assert_eq!(locks.tracked(), 0);
    }
}
