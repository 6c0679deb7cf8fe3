//! Timer-driven and manually-triggered batch scheduling.
//!
//! Two triggers drive `take_batch`: a fixed 1-second interval and explicit
//! flush calls. Each trigger takes at most one batch and hands it to the
//! dispatcher fire-and-forget, so triggers return immediately and multiple
//! dispatches may be in flight concurrently. Only the act of taking a
//! batch serializes (on the queue lock), never the act of sending it.

use std::sync::Arc;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::constants::{FLUSH_INTERVAL, MAX_BATCH_ENTRIES};
use crate::dispatcher::Dispatcher;
use crate::queue::EntryQueue;

/// Takes one batch from the queue and dispatches it, if any entries are
/// pending. Shared by the timer, manual flushes, and the shutdown drain.
pub(crate) fn flush_once(queue: &EntryQueue, dispatcher: &Dispatcher) {
    let batch = queue.take_batch(MAX_BATCH_ENTRIES);
    if !batch.is_empty() {
        dispatcher.dispatch(batch);
    }
}

/// Periodic flush loop. Runs until the token is cancelled.
///
/// The task is advisory background work: it lives inside the runtime and
/// cannot keep the process alive past runtime shutdown, and graceful
/// shutdown cancels it explicitly before the final drain.
pub(crate) async fn run_flush_timer(
    queue: Arc<EntryQueue>,
    dispatcher: Dispatcher,
    cancel: CancellationToken,
) {
    let mut ticker = interval(FLUSH_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                flush_once(&queue, &dispatcher);
            }
            () = cancel.cancelled() => {
                debug!("flush timer stopped");
                break;
            }
        }
    }
}
