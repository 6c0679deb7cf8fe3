//! Log entry data model.
//!
//! A [`LogEntry`] is an immutable value created at the moment of logging:
//! a severity level, an already-sanitized message, a monotonic RFC3339
//! timestamp, and a map of JSON-compatible fields. Entries are owned by the
//! queue until handed to a batch, then owned solely by that batch; they are
//! serialized verbatim onto the wire.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Severity of a log entry, ordered by ascending priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// Numeric priority of the level (10/20/30/40/50).
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            Level::Debug => 10,
            Level::Info => 20,
            Level::Warning => 30,
            Level::Error => 40,
            Level::Critical => 50,
        }
    }

    /// Wire name of the level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One log record, immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Severity level.
    pub level: Level,
    /// Message text, already trimmed and length-capped.
    pub message: String,
    /// RFC3339 timestamp with nanosecond precision, e.g.
    /// `2026-08-07T09:15:42.123456789Z`. Strictly increasing across
    /// entries produced through one sender.
    pub timestamp: String,
    /// Structured context attached to the entry.
    pub fields: Map<String, Value>,
}

impl LogEntry {
    /// Creates an entry without fields.
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>, timestamp: String) -> Self {
        Self::with_fields(level, message, timestamp, Map::new())
    }

    /// Creates an entry carrying structured fields.
    #[must_use]
    pub fn with_fields(
        level: Level,
        message: impl Into<String>,
        timestamp: String,
        fields: Map<String, Value>,
    ) -> Self {
        LogEntry {
            level,
            message: message.into(),
            timestamp,
            fields,
        }
    }
}
