//! Time-related utilities with a clock abstraction for testability.

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of wall-clock time, injectable so that timestamps are deterministic in tests.
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in milliseconds.
    fn now_millis(&self) -> i64;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        now_millis()
    }
}

/// Clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_millis: i64,
}

impl FixedClock {
    pub fn new(fixed_millis: i64) -> Self {
        Self { fixed_millis }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_millis
    }
}

/// Current Unix timestamp in milliseconds (UTC).
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format a Unix millisecond timestamp as RFC 3339 (UTC, millisecond precision).
///
/// Out-of-range values fall back to the Unix epoch.
pub fn millis_to_rfc3339(timestamp_millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
