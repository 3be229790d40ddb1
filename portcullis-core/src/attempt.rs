//! Login attempt records.
//!
//! One row is written per resolved login attempt, success or failure, keyed
//! by the (origin, account) pair. Rows are immutable once written: the
//! request path only appends, and the only deletions come from the retention
//! sweeper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A login attempt as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    /// Storage-assigned row id.
    pub id: i64,
    /// Stable identifier of the request's network source.
    pub origin: String,
    /// The account identifier as submitted, not verified to exist.
    pub account: String,
    /// When the attempt was resolved, assigned from the recorder's clock.
    pub attempted_at: DateTime<Utc>,
    /// Whether the credential check succeeded.
    pub succeeded: bool,
}

/// A login attempt that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoginAttempt {
    pub origin: String,
    pub account: String,
    pub attempted_at: DateTime<Utc>,
    pub succeeded: bool,
}

impl NewLoginAttempt {
    pub fn new(
        origin: impl Into<String>,
        account: impl Into<String>,
        attempted_at: DateTime<Utc>,
        succeeded: bool,
    ) -> Self {
        Self {
            origin: origin.into(),
            account: account.into(),
            attempted_at,
            succeeded,
        }
    }
}

/// Windowed failure statistics for one (origin, account) pair.
///
/// Produced by the ledger's count query: how many failures fall inside the
/// trailing window, and when the most recent of them happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttemptWindow {
    /// Failures strictly newer than the cutoff.
    pub count: u32,
    /// Timestamp of the latest in-window failure, if any.
    pub last_failure_at: Option<DateTime<Utc>>,
}
