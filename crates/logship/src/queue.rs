//! Bounded in-memory buffer of pending log entries.
//!
//! The queue is the hand-off point between producers (logging call sites)
//! and the batch scheduler. Capacity is fixed; an enqueue against a full or
//! stopped queue silently drops the incoming entry and surfaces a
//! diagnostic, never an error to the caller. Batches are removed from the
//! front atomically with respect to other takers, so no entry appears in
//! two batches and none is lost between removal and inclusion.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::constants::MAX_QUEUE_SIZE;
use crate::entry::LogEntry;

/// FIFO buffer of entries waiting to be batched.
///
/// All operations complete in bounded time without suspending; the internal
/// mutex is never held across an await point.
pub struct EntryQueue {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    stopped: AtomicBool,
}

impl EntryQueue {
    /// Creates a queue with a custom capacity. Used by tests; production
    /// callers go through [`EntryQueue::default`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        EntryQueue {
            entries: Mutex::new(VecDeque::new()),
            capacity,
            stopped: AtomicBool::new(false),
        }
    }

    /// Appends an entry to the back of the queue.
    ///
    /// Dropped silently (diagnostic only) when the queue is stopped or
    /// already at capacity. The incoming entry is the one rejected; queued
    /// entries are never evicted.
    pub fn enqueue(&self, entry: LogEntry) {
        if self.stopped.load(Ordering::SeqCst) {
            debug!("queue stopped, dropping log entry");
            return;
        }

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() >= self.capacity {
            warn!(
                "log queue full ({} entries), dropping incoming entry",
                self.capacity
            );
            return;
        }
        entries.push_back(entry);
    }

    /// Removes and returns up to `max` entries from the front, preserving
    /// insertion order. Returns an empty vec when the queue is empty.
    pub fn take_batch(&self, max: usize) -> Vec<LogEntry> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let count = max.min(entries.len());
        entries.drain(..count).collect()
    }

    /// Current number of queued entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the queue: every subsequent enqueue is dropped.
    ///
    /// One-way; there is no restart.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Whether [`stop`](EntryQueue::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Default for EntryQueue {
    /// Creates a queue with the production capacity of 10,000 entries.
    fn default() -> Self {
        Self::new(MAX_QUEUE_SIZE)
    }
}
