//! Time-related utilities with clock abstraction for testability.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Timelike, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        get_timestamp_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Manually driven clock for testing time-dependent behavior
///
/// Shared behind an `Arc`, the test moves time forward with [`ManualClock::advance`]
/// while the code under test reads it through the [`Clock`] trait.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a new manual clock starting at the given timestamp
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    /// Set the current time
    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    /// Move the current time forward by `millis`
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Get current Unix timestamp (milliseconds)
pub fn get_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a Unix timestamp (milliseconds) as a zone-less date-time in `tz`
///
/// Format: `YYYY-MM-DDTHH:MM`, followed by `:SS` when the second or the
/// millisecond is non-zero, then `.mmm` when the millisecond is non-zero.
/// Returns `None` for timestamps outside the representable range.
pub fn format_timestamp_in<Tz: TimeZone>(timestamp_millis: i64, tz: &Tz) -> Option<String> {
    let utc: DateTime<Utc> = Utc.timestamp_millis_opt(timestamp_millis).single()?;
    let local = utc.with_timezone(tz).naive_local();
    let millis = local.nanosecond() / 1_000_000;

    let mut rendered = local.format("%Y-%m-%dT%H:%M").to_string();
    if local.second() != 0 || millis != 0 {
        rendered.push_str(&format!(":{:02}", local.second()));
    }
    if millis != 0 {
        rendered.push_str(&format!(".{:03}", millis));
    }
    Some(rendered)
}
