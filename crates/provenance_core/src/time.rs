//! Time types for PROVENANCE.
//!
//! Events carry UTC wall-clock timestamps. The clock is injected so tests
//! can pin time; hashing sees timestamps only as integer nanoseconds.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, PoisonError};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock stopped at `at`
    #[must_use]
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(at) }
    }

    /// Move the clock to `at`
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Nanoseconds since the Unix epoch.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] when `at` lies outside the range an
/// `i64` nanosecond count can represent (roughly 1677..2262).
pub fn unix_nanos(at: &DateTime<Utc>) -> CoreResult<i64> {
    at.timestamp_nanos_opt().ok_or_else(|| CoreError::Encoding {
        reason: format!("timestamp {} is outside the nanosecond range", at.to_rfc3339()),
    })
}
