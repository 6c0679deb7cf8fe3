//! Limits and intervals for the batching/delivery engine.

use std::time::Duration;

/// Maximum number of entries the queue will hold.
///
/// Enqueuing beyond this capacity drops the incoming entry (reject-newest)
/// with a diagnostic. Assuming an average entry of ~1KB this bounds the
/// buffer at roughly 10MB.
pub(crate) const MAX_QUEUE_SIZE: usize = 10_000;

/// Maximum number of entries per batch.
///
/// A single `take_batch` call, and therefore a single POST payload, never
/// carries more than this many entries.
pub(crate) const MAX_BATCH_ENTRIES: usize = 1000;

/// Interval between periodic flushes.
pub(crate) const FLUSH_INTERVAL: Duration = Duration::from_millis(1000);

/// Per-request timeout for a single delivery attempt.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Ceiling on the shutdown drain wait.
///
/// Dispatches still in flight when this elapses are abandoned without
/// further signal.
pub(crate) const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// How often the shutdown coordinator re-reads the in-flight counter.
pub(crate) const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Maximum message length, in characters, after sanitization.
pub(crate) const MAX_MESSAGE_LENGTH: usize = 4096;

/// `User-Agent` sent with every delivery request.
pub(crate) const USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
