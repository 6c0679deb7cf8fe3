//! The sender: public face of the batching/delivery engine.
//!
//! ```text
//!   logging call sites / adapter
//!            │ enqueue (never fails, never blocks)
//!            v
//!     ┌─────────────┐   timer tick / flush()   ┌──────────────┐
//!     │ EntryQueue  │ ───── take_batch ──────> │  Dispatcher  │ ──> HTTP
//!     └─────────────┘                          └──────────────┘
//!            ▲                                        │
//!            │ stop + final drain        in-flight counter
//!            └──────────── shutdown() ────────────────┘
//! ```
//!
//! A [`Sender`] is a cloneable handle; clones share the queue, dispatcher,
//! timestamp generator, and lifecycle state. The lifecycle is one-way:
//! `Running → Draining → Stopped`. After shutdown, `enqueue` and `flush`
//! become safe no-ops.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{ConfigError, SenderConfig};
use crate::constants::{MAX_BATCH_ENTRIES, SHUTDOWN_POLL_INTERVAL, SHUTDOWN_TIMEOUT};
use crate::dispatcher::Dispatcher;
use crate::entry::{Level, LogEntry};
use crate::queue::EntryQueue;
use crate::sanitize;
use crate::scheduler;
use crate::timestamp::TimestampGenerator;

const STATE_RUNNING: u8 = 0;
const STATE_DRAINING: u8 = 1;
const STATE_STOPPED: u8 = 2;

/// Handle to a running log-shipping pipeline.
#[derive(Clone)]
pub struct Sender {
    queue: Arc<EntryQueue>,
    dispatcher: Dispatcher,
    timestamps: Arc<TimestampGenerator>,
    cancel: CancellationToken,
    state: Arc<AtomicU8>,
}

impl Sender {
    /// Validates the configuration and starts the pipeline.
    ///
    /// Spawns the periodic flush task. Must be called from within a tokio
    /// runtime. This is the library's only fallible entry point; every
    /// operation on the returned sender is total from the caller's
    /// perspective.
    pub fn start(config: SenderConfig) -> Result<Sender, ConfigError> {
        config.validate()?;

        let queue = Arc::new(EntryQueue::default());
        let dispatcher = Dispatcher::new(Arc::new(config));
        let cancel = CancellationToken::new();

        tokio::spawn(scheduler::run_flush_timer(
            Arc::clone(&queue),
            dispatcher.clone(),
            cancel.clone(),
        ));

        Ok(Sender {
            queue,
            dispatcher,
            timestamps: Arc::new(TimestampGenerator::new()),
            cancel,
            state: Arc::new(AtomicU8::new(STATE_RUNNING)),
        })
    }

    /// Adds an already-constructed entry to the queue.
    ///
    /// Never fails visibly: a full or stopped queue drops the entry with a
    /// diagnostic.
    pub fn enqueue(&self, entry: LogEntry) {
        self.queue.enqueue(entry);
    }

    /// Sanitizes, timestamps, and enqueues a message without fields.
    pub fn log(&self, level: Level, message: &str) {
        self.log_with_fields(level, message, Map::new());
    }

    /// Sanitizes, timestamps, and enqueues a message with structured
    /// fields.
    pub fn log_with_fields(&self, level: Level, message: &str, fields: Map<String, Value>) {
        let entry = LogEntry::with_fields(
            level,
            sanitize::clean_message(message),
            self.timestamps.next(),
            sanitize::clean_fields(fields),
        );
        self.queue.enqueue(entry);
    }

    /// Logs at DEBUG.
    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    /// Logs at INFO.
    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Logs at WARNING.
    pub fn warning(&self, message: &str) {
        self.log(Level::Warning, message);
    }

    /// Logs at ERROR.
    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    /// Logs at CRITICAL.
    pub fn critical(&self, message: &str) {
        self.log(Level::Critical, message);
    }

    /// Triggers one batch dispatch now.
    ///
    /// Synchronous trigger, asynchronous completion: the call returns once
    /// the batch is handed to the dispatcher; the HTTP exchange proceeds
    /// independently. A safe no-op once shutdown has begun.
    pub fn flush(&self) {
        if self.state.load(Ordering::SeqCst) != STATE_RUNNING {
            return;
        }
        scheduler::flush_once(&self.queue, &self.dispatcher);
    }

    /// Number of entries currently queued and not yet batched.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Timestamps produced by this sender's generator.
    ///
    /// Exposed for callers constructing [`LogEntry`] values directly.
    pub fn next_timestamp(&self) -> String {
        self.timestamps.next()
    }

    /// Drains and stops the pipeline.
    ///
    /// Sequence: freeze the queue, cancel the flush timer, dispatch
    /// whatever remains, then wait up to a 5-second ceiling for in-flight
    /// deliveries to settle. Entries still in flight when the ceiling is
    /// reached are abandoned without further signal.
    ///
    /// Idempotent: once shutdown has begun, further calls return
    /// immediately.
    pub async fn shutdown(&self) {
        if self
            .state
            .compare_exchange(
                STATE_RUNNING,
                STATE_DRAINING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return;
        }

        debug!("sender shutting down, draining queue");
        self.queue.stop();
        self.cancel.cancel();

        // Final drain: everything still queued goes out now, in batch-sized
        // slices.
        loop {
            let batch = self.queue.take_batch(MAX_BATCH_ENTRIES);
            if batch.is_empty() {
                break;
            }
            self.dispatcher.dispatch(batch);
        }

        let deadline = Instant::now() + SHUTDOWN_TIMEOUT;
        while self.dispatcher.in_flight() > 0 && Instant::now() < deadline {
            sleep(SHUTDOWN_POLL_INTERVAL).await;
        }

        let abandoned = self.dispatcher.in_flight();
        if abandoned > 0 {
            warn!("shutdown ceiling reached with {abandoned} dispatches still in flight");
        }
        self.state.store(STATE_STOPPED, Ordering::SeqCst);
    }
}
