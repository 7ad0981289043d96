//! Bounded registry of in-flight cancelable requests.
//!
//! # Responsibilities
//! - Track cancel handles grouped by an arbitrary tag
//! - Cancel and drop every handle in a group on demand
//! - Evict the oldest entry once the buffer is full
//!
//! # Design Decisions
//! - Fixed-capacity FIFO: insertion at the newest end, eviction at the
//!   oldest end, never exceeds capacity
//! - Evicted handles are dropped without firing; their requests simply
//!   become uncancellable

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::transport::Cancelable;

/// One in-flight cancelable request.
struct PendingCancelable {
    group_tag: String,
    handle: Box<dyn Cancelable>,
}

/// Bounded FIFO buffer of cancel handles, grouped by tag.
pub struct CancelRegistry {
    entries: Mutex<VecDeque<PendingCancelable>>,
    capacity: usize,
}

impl CancelRegistry {
    /// Create a registry holding at most `capacity` handles.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Register `handle` under `group_tag`, evicting the oldest entry if
    /// the buffer is full.
    pub fn register(&self, group_tag: &str, handle: Box<dyn Cancelable>) {
        let mut entries = self.entries.lock().expect("cancel registry mutex poisoned");
        entries.push_back(PendingCancelable {
            group_tag: group_tag.to_string(),
            handle,
        });
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Cancel every handle registered under `group_tag` and remove them.
    ///
    /// Returns how many handles fired. A tag with no entries is a no-op,
    /// which makes repeated calls idempotent.
    pub fn cancel_group(&self, group_tag: &str) -> usize {
        let matched: Vec<PendingCancelable> = {
            let mut entries = self.entries.lock().expect("cancel registry mutex poisoned");
            let mut matched = Vec::new();
            let mut kept = VecDeque::with_capacity(entries.len());
            for entry in entries.drain(..) {
                if entry.group_tag == group_tag {
                    matched.push(entry);
                } else {
                    kept.push_back(entry);
                }
            }
            *entries = kept;
            matched
        };

        // Handles fire outside the lock.
        for entry in &matched {
            entry.handle.cancel();
        }
        matched.len()
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("cancel registry mutex poisoned")
            .len()
    }

    /// True when no handle is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
