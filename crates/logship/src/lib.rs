//! # logship
//!
//! Asynchronous batching client for shipping application logs to a remote
//! collection endpoint over HTTP. Logging call sites enqueue entries into a
//! bounded in-memory queue; a background timer and explicit flushes slice
//! the queue into batches and deliver them concurrently, fire-and-forget,
//! without ever blocking or failing the caller.
//!
//! Delivery is best-effort and at-most-once: a full queue drops the newest
//! entry, a failed request drops its batch, and both surface only as
//! operator diagnostics. The library favors application liveness over
//! delivery guarantees.
//!
//! ## Modules
//!
//! - [`config`]: sender configuration and construction-time validation
//! - [`entry`]: log levels and the immutable entry value
//! - [`timestamp`]: monotonic unique timestamp generation
//! - [`queue`]: bounded entry buffer with reject-newest overflow
//! - [`dispatcher`]: concurrent non-blocking HTTP delivery
//! - [`sender`]: the public handle tying the pipeline together
//! - [`sanitize`]: pure message/field pre-processing
//! - [`adapter`]: `log` crate integration
//!
//! ## Example
//!
//! ```rust,no_run
//! use logship::{Sender, SenderConfig, Level};
//!
//! # async fn run() -> Result<(), logship::ConfigError> {
//! let sender = Sender::start(
//!     SenderConfig::new(
//!         "https://ingest.example.com",
//!         "0191f3a2-7c4d-4b8e-9f10-2a3b4c5d6e7f",
//!     )
//!     .with_api_key("sk-live-abc123"),
//! )?;
//!
//! sender.info("service started");
//! sender.log(Level::Error, "connection pool exhausted");
//!
//! // Deliver everything still queued, then stop.
//! sender.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![deny(clippy::unwrap_used)]
#![deny(unreachable_pub)]
#![deny(unused_extern_crates)]
#![allow(clippy::module_name_repetitions)]

pub mod adapter;
pub mod config;
pub mod dispatcher;
pub mod entry;
pub mod queue;
pub mod sanitize;
pub mod sender;
pub mod timestamp;

mod constants;
mod scheduler;

pub use adapter::LogShipper;
pub use config::{ConfigError, SenderConfig};
pub use dispatcher::{DeliveryResponse, EntryRejection};
pub use entry::{Level, LogEntry};
pub use sender::Sender;
pub use timestamp::TimestampGenerator;
