//! Injectable time source.
//!
//! Lockout verdicts and retention cutoffs are pure functions of "now", so the
//! services take their clock as a dependency instead of reading the ambient
//! wall clock. Production code uses [`SystemClock`]; tests substitute a
//! manually advanced clock to exercise window boundaries without sleeping.

use chrono::{DateTime, Utc};

/// Source of the current time for lockout math and retention sweeps.
pub trait Clock: Send + Sync + 'static {
    /// The current moment in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
