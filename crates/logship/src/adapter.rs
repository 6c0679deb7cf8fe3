//! Adapter routing `log` crate records into the sender.
//!
//! Installing the shipper as the global logger lets existing
//! `log::info!`-style call sites feed the delivery pipeline without code
//! changes. Records below the configured minimum level are filtered before
//! an entry is constructed.

use log::{Metadata, Record};
use serde_json::{json, Map, Value};

use crate::entry::Level;
use crate::sender::Sender;

/// `log::Log` implementation that converts records into canonical entries
/// and enqueues them.
///
/// The shipper's own internal diagnostics go through `tracing`; avoid
/// bridging those back into `log` output that this adapter consumes, or
/// delivery failures would feed the queue they are reporting on.
pub struct LogShipper {
    sender: Sender,
    min_level: log::LevelFilter,
}

impl LogShipper {
    /// Creates an adapter over a running sender.
    #[must_use]
    pub fn new(sender: Sender, min_level: log::LevelFilter) -> Self {
        LogShipper { sender, min_level }
    }

    /// Installs the adapter as the process-global logger.
    pub fn install(
        sender: Sender,
        min_level: log::LevelFilter,
    ) -> Result<(), log::SetLoggerError> {
        log::set_max_level(min_level);
        log::set_boxed_logger(Box::new(LogShipper::new(sender, min_level)))
    }
}

/// `log` has no CRITICAL; Trace folds into DEBUG alongside Debug.
fn map_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warning,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

impl log::Log for LogShipper {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.min_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut fields = Map::new();
        fields.insert("target".to_string(), json!(record.target()));
        if let Some(module) = record.module_path() {
            fields.insert("module".to_string(), json!(module));
        }
        if let Some(file) = record.file() {
            fields.insert("file".to_string(), json!(file));
        }
        if let Some(line) = record.line() {
            fields.insert("line".to_string(), Value::from(line));
        }

        self.sender.log_with_fields(
            map_level(record.level()),
            &record.args().to_string(),
            fields,
        );
    }

    fn flush(&self) {
        self.sender.flush();
    }
}
