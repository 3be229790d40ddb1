//! Lockout policy configuration and verdicts.

use chrono::Duration;

/// Policy constants for login lockout.
///
/// Read once when the service is constructed and immutable for the process
/// lifetime. `window` doubles as the sliding window over which failures are
/// counted and the lockout length measured from the last failure.
#[derive(Debug, Clone)]
pub struct LockoutConfig {
    /// When false, checks always report unlocked and nothing is recorded.
    pub enabled: bool,
    /// Failures inside the window required to lock the pair.
    pub max_attempts: u32,
    /// Sliding window and lockout duration.
    pub window: Duration,
    /// How often the retention sweeper ticks.
    pub sweep_interval: std::time::Duration,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            window: Duration::minutes(15),
            sweep_interval: std::time::Duration::from_secs(3600),
        }
    }
}

impl LockoutConfig {
    /// A configuration with protection switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// The outcome of a lockout check for one (origin, account) pair.
///
/// Ephemeral and derived: computed on demand from the ledger, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutDecision {
    /// Whether the pair is currently locked out.
    pub locked: bool,
    /// In-window failure count observed by the check.
    pub attempts: u32,
    /// Time until the lock expires. Zero when not locked.
    pub remaining: Duration,
}

impl LockoutDecision {
    /// An unlocked verdict carrying the observed failure count.
    pub fn unlocked(attempts: u32) -> Self {
        Self {
            locked: false,
            attempts,
            remaining: Duration::zero(),
        }
    }

    /// Remaining lockout time in whole milliseconds, clamped at zero.
    pub fn remaining_ms(&self) -> i64 {
        self.remaining.num_milliseconds().max(0)
    }

    /// Remaining lockout time rounded up to whole minutes, for the
    /// human-readable rejection message.
    pub fn remaining_minutes(&self) -> i64 {
        // remaining_ms() is clamped at zero, so the unsigned div_ceil
        // (stable, unlike i64::div_ceil) is exact for every reachable value
        (self.remaining_ms() as u64).div_ceil(60_000) as i64
    }
}
