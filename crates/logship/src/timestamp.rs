//! Monotonic unique timestamp generation.
//!
//! Log ordering relies on timestamps being strictly increasing even when
//! two entries are produced within the clock's resolution window or the
//! wall clock steps backward. The generator captures a wall-clock baseline
//! once at construction and advances it with a monotonic [`Instant`] delta,
//! so emitted values stay wall-clock-meaningful while being immune to
//! clock adjustments. Whenever a candidate would not advance past the last
//! emitted value, the generator emits `last + 1` nanoseconds instead.

use std::sync::{Mutex, PoisonError};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

struct ClockState {
    /// Wall-clock nanoseconds since epoch at the moment `baseline` was taken.
    baseline_epoch_ns: u64,
    /// Monotonic reference point paired with `baseline_epoch_ns`.
    baseline: Instant,
    /// Last emitted value, nanoseconds since epoch. 0 before first use.
    last_ns: u64,
}

/// Process-wide source of strictly increasing, uniquely valued timestamps.
///
/// The read-compare-update sequence runs under a single mutex so concurrent
/// callers can never observe or produce a non-increasing sequence. The lock
/// is held only for the comparison and store; `next` never suspends.
pub struct TimestampGenerator {
    state: Mutex<ClockState>,
}

impl TimestampGenerator {
    /// Creates a generator, capturing the wall-clock baseline now.
    #[must_use]
    pub fn new() -> Self {
        let baseline_epoch_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        TimestampGenerator {
            state: Mutex::new(ClockState {
                baseline_epoch_ns,
                baseline: Instant::now(),
                last_ns: 0,
            }),
        }
    }

    /// Returns the next timestamp as nanoseconds since epoch.
    ///
    /// Strictly greater than every value previously returned by this
    /// generator, regardless of caller interleaving.
    pub fn next_nanos(&self) -> u64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let elapsed = u64::try_from(state.baseline.elapsed().as_nanos()).unwrap_or(u64::MAX);
        let candidate = state.baseline_epoch_ns.saturating_add(elapsed);
        let value = if candidate <= state.last_ns {
            state.last_ns + 1
        } else {
            candidate
        };
        state.last_ns = value;
        value
    }

    /// Returns the next timestamp formatted as RFC3339 with nanosecond
    /// precision, e.g. `2026-08-07T09:15:42.123456789Z`.
    pub fn next(&self) -> String {
        format_rfc3339_nanos(self.next_nanos())
    }
}

impl Default for TimestampGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats nanoseconds-since-epoch as `YYYY-MM-DDTHH:MM:SS.NNNNNNNNNZ`.
///
/// Always 9 fractional digits, UTC, `Z` suffix.
pub(crate) fn format_rfc3339_nanos(epoch_ns: u64) -> String {
    let secs = i64::try_from(epoch_ns / 1_000_000_000).unwrap_or(i64::MAX);
    let nanos = u32::try_from(epoch_ns % 1_000_000_000).unwrap_or(0);
    let datetime = DateTime::<Utc>::from_timestamp(secs, nanos).unwrap_or(DateTime::UNIX_EPOCH);
    datetime.format("%Y-%m-%dT%H:%M:%S%.9fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_sequential_calls_strictly_increase() {
        let generator = TimestampGenerator::new();
        let mut previous = 0;
        for _ in 0..10_000 {
            let value = generator.next_nanos();
            assert!(value > previous, "{value} should exceed {previous}");
            previous = value;
        }
    }

    #[test]
    fn test_concurrent_calls_produce_distinct_values() {
        let generator = Arc::new(TimestampGenerator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let generator = Arc::clone(&generator);
            handles.push(thread::spawn(move || {
                (0..1000).map(|_| generator.next_nanos()).collect::<Vec<u64>>()
            }));
        }

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("worker panicked"))
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total, "duplicate timestamps were emitted");
    }

    #[test]
    fn test_per_thread_sequences_strictly_increase() {
        let generator = Arc::new(TimestampGenerator::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let generator = Arc::clone(&generator);
            handles.push(thread::spawn(move || {
                let mut previous = 0;
                for _ in 0..1000 {
                    let value = generator.next_nanos();
                    assert!(value > previous);
                    previous = value;
                }
            }));
        }
        for handle in handles {
            handle.join().expect("worker panicked");
        }
    }

    #[test]
    fn test_stalled_clock_falls_back_to_increment() {
        let generator = TimestampGenerator::new();
        // Force the last value far into the future so every candidate stalls.
        let future = generator.next_nanos() + 1_000_000_000_000;
        {
            let mut state = generator
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            state.last_ns = future;
        }
        assert_eq!(generator.next_nanos(), future + 1);
        assert_eq!(generator.next_nanos(), future + 2);
    }

    #[test]
    fn test_format_has_nine_fractional_digits() {
        let formatted = format_rfc3339_nanos(1_000_000_000);
        assert_eq!(formatted, "1970-01-01T00:00:01.000000000Z");

        let formatted = format_rfc3339_nanos(1_786_439_742_123_456_789);
        let fraction = formatted
            .split('.')
            .nth(1)
            .and_then(|f| f.strip_suffix('Z'))
            .expect("fractional part");
        assert_eq!(fraction.len(), 9);
        assert_eq!(fraction, "123456789");
        assert!(formatted.ends_with('Z'));
    }

    #[test]
    fn test_next_returns_wall_clock_meaningful_values() {
        let generator = TimestampGenerator::new();
        let formatted = generator.next();
        // Sanity: shaped like an RFC3339 instant from this century.
        assert_eq!(formatted.len(), "2026-08-07T09:15:42.123456789Z".len());
        assert!(formatted.starts_with("20"));
        assert!(formatted.contains('T'));
    }
}
