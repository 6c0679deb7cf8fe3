//! Pure pre-processing applied before an entry enters the queue.
//!
//! Stateless, synchronous helpers: message trimming and length-capping,
//! field-key hygiene, and a "serialize or stringify" fallback for values of
//! arbitrary shape.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::MAX_MESSAGE_LENGTH;

/// Marker appended to a message that was cut at the length cap.
const TRUNCATION_MARKER: char = '\u{2026}';

/// Trims surrounding whitespace and caps the message at the configured
/// character limit, appending a truncation marker when cut.
///
/// Operates on characters, not bytes, so multi-byte text is never split
/// mid-codepoint.
#[must_use]
pub fn clean_message(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.char_indices();
    match chars.nth(MAX_MESSAGE_LENGTH) {
        None => trimmed.to_string(),
        Some((cut, _)) => {
            let mut capped = trimmed[..cut].to_string();
            capped.push(TRUNCATION_MARKER);
            capped
        }
    }
}

/// Normalizes a field map: trims keys and discards entries whose key is
/// empty after trimming. Values are passed through unchanged; they are
/// JSON values by construction.
#[must_use]
pub fn clean_fields(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .filter_map(|(key, value)| {
            let key = key.trim();
            if key.is_empty() {
                None
            } else {
                Some((key.to_string(), value))
            }
        })
        .collect()
}

/// Converts an arbitrary value into a JSON value, falling back to its debug
/// rendering when it cannot be serialized.
pub fn coerce_value<T: Serialize + std::fmt::Debug>(value: T) -> Value {
    serde_json::to_value(&value).unwrap_or_else(|_| Value::String(format!("{value:?}")))
}
