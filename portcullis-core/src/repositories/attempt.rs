//! Repository trait for the login attempt ledger.
//!
//! This module defines the storage interface for the append-mostly log of
//! login attempts that lockout decisions are derived from.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    attempt::{AttemptWindow, LoginAttempt, NewLoginAttempt},
};

/// Repository for login attempt records.
///
/// The ledger is a pure time-indexed store queried by (origin, account,
/// time-range); it interprets no policy. The request path only inserts, the
/// retention sweeper is the only deleter, and lock state is never stored —
/// it is recomputed from the windowed count on every check.
///
/// # Security Considerations
///
/// - Attempts are recorded for all submitted account identifiers, even
///   non-existent ones, to prevent user enumeration.
/// - Successful attempts are stored too, and must never remove or reset
///   prior failure rows; failures age out of relevance only by time.
/// - Implementations need a composite index on (origin, account,
///   attempted_at) so the windowed count stays cheap for a single pair.
#[async_trait]
pub trait LoginAttemptRepository: Send + Sync + 'static {
    /// Append one resolved attempt to the ledger.
    ///
    /// Must succeed or fail atomically; a partial write is never observable.
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt to persist, timestamped by the caller's clock
    ///
    /// # Returns
    ///
    /// The stored [`LoginAttempt`] with its assigned id.
    async fn insert(&self, attempt: &NewLoginAttempt) -> Result<LoginAttempt, Error>;

    /// Count failures for a pair strictly newer than the cutoff.
    ///
    /// Only rows with `succeeded = false` and `attempted_at > cutoff` are
    /// counted; successes in the window are ignored.
    ///
    /// # Arguments
    ///
    /// * `origin` - Network origin half of the lockout key
    /// * `account` - Account identifier half of the lockout key
    /// * `cutoff` - Exclusive lower bound on `attempted_at`
    ///
    /// # Returns
    ///
    /// An [`AttemptWindow`] with the count and the latest failure timestamp.
    async fn count_failures_since(
        &self,
        origin: &str,
        account: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<AttemptWindow, Error>;

    /// Delete every record strictly older than the cutoff.
    ///
    /// Applies to all pairs and both outcomes; this is the retention sweep,
    /// not an unlock mechanism (checks are already time-bounded).
    ///
    /// # Arguments
    ///
    /// * `cutoff` - Exclusive upper bound on `attempted_at`
    ///
    /// # Returns
    ///
    /// The number of rows deleted.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, Error>;
}
