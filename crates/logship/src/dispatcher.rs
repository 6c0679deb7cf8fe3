//! Concurrent, non-blocking batch delivery over HTTP.
//!
//! Each batch is posted to the collection endpoint from its own spawned
//! task, so a timer tick or manual flush returns immediately while the
//! exchange proceeds independently. Delivery is best-effort and
//! at-most-once: any failure (non-2xx status, network error, timeout,
//! unparseable body) is converted to a diagnostic at its origin and the
//! batch is discarded. Nothing raises past the dispatch boundary.
//!
//! An in-flight counter is incremented before a request starts and
//! decremented on every exit path; the shutdown coordinator polls it to
//! bound its drain wait.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, error, warn};

use crate::config::SenderConfig;
use crate::constants::{REQUEST_TIMEOUT, USER_AGENT};
use crate::entry::LogEntry;

/// Wire payload: `{"logs": [...]}`.
#[derive(Serialize)]
struct LogsPayload<'a> {
    logs: &'a [LogEntry],
}

/// Server's reply to a delivery. Parsed opportunistically; a malformed body
/// after a successful status is ignored.
#[derive(Debug, Deserialize)]
pub struct DeliveryResponse {
    /// Number of entries the server accepted.
    #[serde(default)]
    pub accepted: u64,
    /// Number of entries the server rejected.
    #[serde(default)]
    pub rejected: u64,
    /// Optional human-readable summary.
    #[serde(default)]
    pub message: Option<String>,
    /// Per-entry rejections, batch-relative.
    #[serde(default)]
    pub errors: Option<Vec<EntryRejection>>,
}

/// One server-reported rejection within an otherwise accepted batch.
#[derive(Debug, Deserialize)]
pub struct EntryRejection {
    /// Index of the rejected entry within the batch that was sent.
    pub index: usize,
    /// Server's reason.
    pub message: String,
}

/// Fire-and-forget batch transmitter with in-flight accounting.
#[derive(Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    config: Arc<SenderConfig>,
    in_flight: Arc<AtomicUsize>,
    /// Runtime the delivery tasks are spawned onto. Captured at
    /// construction so dispatch works from non-runtime threads (e.g. a
    /// `log` adapter call site).
    runtime: Handle,
}

impl Dispatcher {
    /// Creates a dispatcher for the given configuration.
    ///
    /// Must be called from within a tokio runtime; the current runtime
    /// handle is captured for spawning delivery tasks.
    #[must_use]
    pub fn new(config: Arc<SenderConfig>) -> Self {
        Dispatcher {
            client: build_client(),
            config,
            in_flight: Arc::new(AtomicUsize::new(0)),
            runtime: Handle::current(),
        }
    }

    /// Number of dispatches that have started and not yet reached a
    /// terminal outcome.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Sends a batch without waiting for the exchange to complete.
    ///
    /// The in-flight counter is incremented before this returns, so a
    /// caller that dispatches and then polls [`in_flight`](Self::in_flight)
    /// cannot miss the dispatch.
    pub fn dispatch(&self, batch: Vec<LogEntry>) {
        if batch.is_empty() {
            return;
        }

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlightGuard {
            counter: Arc::clone(&self.in_flight),
        };

        let client = self.client.clone();
        let config = Arc::clone(&self.config);
        self.runtime.spawn(async move {
            // Decrements on every exit path, including task cancellation.
            let _guard = guard;
            send(client, config, batch).await;
        });
    }
}

/// Decrements the in-flight counter when dropped.
struct InFlightGuard {
    counter: Arc<AtomicUsize>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// One delivery attempt. Every failure is terminal for the batch.
async fn send(client: reqwest::Client, config: Arc<SenderConfig>, batch: Vec<LogEntry>) {
    let mut request = client
        .post(config.intake_url())
        .timeout(REQUEST_TIMEOUT)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .json(&LogsPayload { logs: &batch });
    if let Some(api_key) = &config.api_key {
        request = request.header("X-API-Key", api_key);
    }

    match request.send().await {
        Ok(response) => {
            let status = response.status();
            if status != StatusCode::OK && status != StatusCode::ACCEPTED {
                warn!(
                    "log delivery returned status {status}, dropping batch of {} entries",
                    batch.len()
                );
                return;
            }
            match response.json::<DeliveryResponse>().await {
                Ok(outcome) => report_outcome(&outcome, &batch),
                Err(e) => debug!("ignoring unparseable delivery response: {e}"),
            }
        }
        Err(e) => {
            // Connection refused, DNS failure, timeout, abort: the batch is
            // lost and the application never hears about it.
            warn!(
                "log delivery failed, dropping batch of {} entries: {e}",
                batch.len()
            );
        }
    }
}

/// Surfaces server-reported per-entry rejections for operator visibility.
///
/// Rejected entries are not retried or resurfaced to the caller.
fn report_outcome(outcome: &DeliveryResponse, batch: &[LogEntry]) {
    if outcome.rejected == 0 {
        debug!("delivered batch: {} accepted", outcome.accepted);
        return;
    }

    warn!(
        "server rejected {} of {} entries{}",
        outcome.rejected,
        batch.len(),
        outcome
            .message
            .as_deref()
            .map(|m| format!(": {m}"))
            .unwrap_or_default()
    );
    for rejection in outcome.errors.iter().flatten() {
        match batch.get(rejection.index) {
            Some(entry) => warn!(
                "entry rejected (index {}): {} [level={} timestamp={} message={:?} fields={}]",
                rejection.index,
                rejection.message,
                entry.level,
                entry.timestamp,
                entry.message,
                serde_json::Value::Object(entry.fields.clone()),
            ),
            None => warn!(
                "server reported rejection for out-of-range index {}: {}",
                rejection.index, rejection.message
            ),
        }
    }
}

fn build_client() -> reqwest::Client {
    match reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            error!("failed to build HTTP client, falling back to defaults: {e}");
            reqwest::Client::new()
        }
    }
}
