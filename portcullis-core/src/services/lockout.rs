//! Login lockout service for (origin, account) pair-based protection.
//!
//! This module implements brute force protection that tracks every resolved
//! login attempt per (network origin, account identifier) pair and refuses
//! further attempts once too many failures land inside a sliding window.
//!
//! # Features
//!
//! - Per-(origin, account) attempt tracking
//! - Automatic lockout after a configurable number of in-window failures
//! - Time-based unlock with no stored lock state
//! - Full audit trail of attempts, successes included
//!
//! # Example
//!
//! ```rust,ignore
//! use portcullis_core::services::LockoutService;
//! use portcullis_core::LockoutConfig;
//!
//! let service = LockoutService::new(repository, LockoutConfig::default());
//!
//! // Check before credential verification
//! let decision = service.check_lockout("203.0.113.7", "alice").await?;
//! if decision.locked {
//!     // Reject with the remaining wait
//! }
//!
//! // Report the outcome afterwards
//! service.record_attempt("203.0.113.7", "alice", false).await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    Error,
    attempt::{AttemptWindow, NewLoginAttempt},
    clock::{Clock, SystemClock},
    error::ValidationError,
    lockout::{LockoutConfig, LockoutDecision},
    repositories::LoginAttemptRepository,
};

/// Service for checking and recording login attempts.
///
/// Lock state is derived on every check from the windowed failure count;
/// nothing is materialized, so a pair unlocks implicitly once its last
/// failure ages past the window.
///
/// # Thread Safety
///
/// The service is safe to share across tasks; the repository handles
/// concurrent access. A `check_lockout` followed by a `record_attempt` for
/// the same pair is deliberately not one transaction: two concurrent
/// requests can both observe `max_attempts - 1` failures and proceed,
/// momentarily admitting slightly more failures than the threshold before
/// the lock becomes observable. The bound is best-effort.
pub struct LockoutService<R: LoginAttemptRepository> {
    repository: Arc<R>,
    config: LockoutConfig,
    clock: Arc<dyn Clock>,
}

impl<R: LoginAttemptRepository> LockoutService<R> {
    /// Create a new LockoutService reading time from the system clock.
    ///
    /// # Arguments
    ///
    /// * `repository` - The ledger implementation storing attempt rows
    /// * `config` - Lockout policy, read once and held for the service lifetime
    pub fn new(repository: Arc<R>, config: LockoutConfig) -> Self {
        Self::with_clock(repository, config, Arc::new(SystemClock))
    }

    /// Create a new LockoutService with an injected clock.
    pub fn with_clock(repository: Arc<R>, config: LockoutConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            config,
            clock,
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &LockoutConfig {
        &self.config
    }

    /// Check if lockout protection is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Get the current lockout verdict for an (origin, account) pair.
    ///
    /// Counts failures strictly newer than `now - window`; at or past the
    /// threshold the pair is locked until `window` after its latest failure.
    /// If protection is disabled, always returns an unlocked verdict.
    ///
    /// # Arguments
    ///
    /// * `origin` - Network origin half of the lockout key
    /// * `account` - Account identifier half of the lockout key
    pub async fn check_lockout(
        &self,
        origin: &str,
        account: &str,
    ) -> Result<LockoutDecision, Error> {
        validate_pair(origin, account)?;

        if !self.config.enabled {
            return Ok(LockoutDecision::unlocked(0));
        }

        let now = self.clock.now();
        let cutoff = now - self.config.window;
        let window = self
            .repository
            .count_failures_since(origin, account, cutoff)
            .await?;

        Ok(self.evaluate(now, &window))
    }

    /// Record one resolved login attempt.
    ///
    /// Called exactly once per attempt that reached credential verification,
    /// for every resolution: wrong password, unknown account, missing
    /// password, and success. Never call it for requests the gate already
    /// rejected as locked — those must not produce ledger rows, which is
    /// what keeps retries from extending the lock.
    ///
    /// If protection is disabled, nothing is written.
    ///
    /// # Arguments
    ///
    /// * `origin` - Network origin half of the lockout key
    /// * `account` - Account identifier half of the lockout key
    /// * `succeeded` - Whether the credential check succeeded
    pub async fn record_attempt(
        &self,
        origin: &str,
        account: &str,
        succeeded: bool,
    ) -> Result<(), Error> {
        validate_pair(origin, account)?;

        if !self.config.enabled {
            return Ok(());
        }

        let attempt = NewLoginAttempt::new(origin, account, self.clock.now(), succeeded);
        self.repository.insert(&attempt).await?;

        Ok(())
    }

    /// Derive a verdict from windowed failure statistics.
    ///
    /// Successes never subtract from the count and there is no stored
    /// unlock: below the threshold the pair is simply unlocked, at or above
    /// it the lock runs out `window` after the latest failure.
    fn evaluate(&self, now: DateTime<Utc>, window: &AttemptWindow) -> LockoutDecision {
        if window.count < self.config.max_attempts {
            return LockoutDecision::unlocked(window.count);
        }

        let remaining = window
            .last_failure_at
            .map(|last| last + self.config.window - now)
            .map(|remaining| remaining.max(Duration::zero()))
            .unwrap_or_else(Duration::zero);

        LockoutDecision {
            locked: true,
            attempts: window.count,
            remaining,
        }
    }
}

fn validate_pair(origin: &str, account: &str) -> Result<(), Error> {
    if origin.is_empty() {
        return Err(ValidationError::EmptyOrigin.into());
    }
    if account.is_empty() {
        return Err(ValidationError::EmptyAccount.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::LoginAttempt;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Mock repository for testing
    struct MockAttemptRepository {
        attempts: Mutex<Vec<LoginAttempt>>,
    }

    impl MockAttemptRepository {
        fn new() -> Self {
            Self {
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn rows(&self) -> Vec<LoginAttempt> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LoginAttemptRepository for MockAttemptRepository {
        async fn insert(&self, attempt: &NewLoginAttempt) -> Result<LoginAttempt, Error> {
            let mut attempts = self.attempts.lock().unwrap();
            let row = LoginAttempt {
                id: attempts.len() as i64 + 1,
                origin: attempt.origin.clone(),
                account: attempt.account.clone(),
                attempted_at: attempt.attempted_at,
                succeeded: attempt.succeeded,
            };
            attempts.push(row.clone());
            Ok(row)
        }

        async fn count_failures_since(
            &self,
            origin: &str,
            account: &str,
            cutoff: DateTime<Utc>,
        ) -> Result<AttemptWindow, Error> {
            let attempts = self.attempts.lock().unwrap();
            let matching: Vec<_> = attempts
                .iter()
                .filter(|a| {
                    a.origin == origin
                        && a.account == account
                        && !a.succeeded
                        && a.attempted_at > cutoff
                })
                .collect();

            Ok(AttemptWindow {
                count: matching.len() as u32,
                last_failure_at: matching.iter().map(|a| a.attempted_at).max(),
            })
        }

        async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
            let mut attempts = self.attempts.lock().unwrap();
            let before_len = attempts.len();
            attempts.retain(|a| a.attempted_at >= cutoff);
            Ok((before_len - attempts.len()) as u64)
        }
    }

    /// Manually advanced clock for deterministic window math
    struct TestClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl TestClock {
        fn at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(now),
            })
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn service_at(
        repo: Arc<MockAttemptRepository>,
        config: LockoutConfig,
    ) -> (LockoutService<MockAttemptRepository>, Arc<TestClock>) {
        let clock = TestClock::at(epoch());
        let service = LockoutService::with_clock(repo, config, clock.clone());
        (service, clock)
    }

    #[tokio::test]
    async fn test_disabled_protection_returns_unlocked() {
        let repo = Arc::new(MockAttemptRepository::new());
        let (service, _clock) = service_at(repo, LockoutConfig::disabled());

        let decision = service.check_lockout("203.0.113.7", "alice").await.unwrap();
        assert!(!decision.locked);
        assert_eq!(decision.attempts, 0);
    }

    #[tokio::test]
    async fn test_disabled_protection_does_not_record() {
        let repo = Arc::new(MockAttemptRepository::new());
        let (service, _clock) = service_at(repo.clone(), LockoutConfig::disabled());

        service
            .record_attempt("203.0.113.7", "alice", false)
            .await
            .unwrap();

        assert!(repo.rows().is_empty());
    }

    #[tokio::test]
    async fn test_empty_pair_is_rejected() {
        let repo = Arc::new(MockAttemptRepository::new());
        let (service, _clock) = service_at(repo, LockoutConfig::default());

        let err = service.check_lockout("", "alice").await.unwrap_err();
        assert!(err.is_validation_error());

        let err = service
            .record_attempt("203.0.113.7", "", true)
            .await
            .unwrap_err();
        assert!(err.is_validation_error());
    }

    #[tokio::test]
    async fn test_below_threshold_stays_unlocked() {
        let repo = Arc::new(MockAttemptRepository::new());
        let (service, _clock) = service_at(repo, LockoutConfig::default());

        for _ in 0..4 {
            service
                .record_attempt("203.0.113.7", "alice", false)
                .await
                .unwrap();
        }

        let decision = service.check_lockout("203.0.113.7", "alice").await.unwrap();
        assert!(!decision.locked);
        assert_eq!(decision.attempts, 4);
        assert_eq!(decision.remaining_ms(), 0);
    }

    #[tokio::test]
    async fn test_locked_after_max_attempts() {
        let repo = Arc::new(MockAttemptRepository::new());
        let (service, clock) = service_at(repo, LockoutConfig::default());

        for _ in 0..5 {
            service
                .record_attempt("203.0.113.7", "alice", false)
                .await
                .unwrap();
        }

        clock.advance(Duration::seconds(2));
        let decision = service.check_lockout("203.0.113.7", "alice").await.unwrap();

        assert!(decision.locked);
        assert_eq!(decision.attempts, 5);
        // All failures landed at t0, so the lock runs out at t0 + 15min
        assert_eq!(decision.remaining_ms(), 15 * 60_000 - 2_000);
    }

    #[tokio::test]
    async fn test_remaining_shrinks_with_time() {
        let repo = Arc::new(MockAttemptRepository::new());
        let (service, clock) = service_at(repo, LockoutConfig::default());

        for _ in 0..5 {
            service
                .record_attempt("203.0.113.7", "alice", false)
                .await
                .unwrap();
        }

        clock.advance(Duration::seconds(2));
        let early = service.check_lockout("203.0.113.7", "alice").await.unwrap();

        clock.advance(Duration::seconds(10));
        let later = service.check_lockout("203.0.113.7", "alice").await.unwrap();

        assert!(later.locked);
        assert!(later.remaining_ms() < early.remaining_ms());
        assert_eq!(early.remaining_ms() - later.remaining_ms(), 10_000);
    }

    #[tokio::test]
    async fn test_unlocks_once_window_passes() {
        let repo = Arc::new(MockAttemptRepository::new());
        let (service, clock) = service_at(repo, LockoutConfig::default());

        for _ in 0..5 {
            service
                .record_attempt("203.0.113.7", "alice", false)
                .await
                .unwrap();
        }

        // One millisecond before expiry the pair is still locked
        clock.advance(Duration::minutes(15) - Duration::milliseconds(1));
        let decision = service.check_lockout("203.0.113.7", "alice").await.unwrap();
        assert!(decision.locked);
        assert_eq!(decision.remaining_ms(), 1);

        // One second past the window the failures no longer count
        clock.advance(Duration::milliseconds(1) + Duration::seconds(1));
        let decision = service.check_lockout("203.0.113.7", "alice").await.unwrap();
        assert!(!decision.locked);
        assert_eq!(decision.attempts, 0);
    }

    #[tokio::test]
    async fn test_success_does_not_clear_failures() {
        let repo = Arc::new(MockAttemptRepository::new());
        let (service, _clock) = service_at(repo.clone(), LockoutConfig::default());

        for _ in 0..5 {
            service
                .record_attempt("203.0.113.7", "alice", false)
                .await
                .unwrap();
        }
        service
            .record_attempt("203.0.113.7", "alice", true)
            .await
            .unwrap();

        // The success is one more row, not a reset
        assert_eq!(repo.rows().len(), 6);

        let decision = service.check_lockout("203.0.113.7", "alice").await.unwrap();
        assert!(decision.locked);
        assert_eq!(decision.attempts, 5);
    }

    #[tokio::test]
    async fn test_successes_do_not_count_toward_lockout() {
        let repo = Arc::new(MockAttemptRepository::new());
        let (service, _clock) = service_at(repo, LockoutConfig::default());

        for _ in 0..4 {
            service
                .record_attempt("203.0.113.7", "alice", false)
                .await
                .unwrap();
        }
        service
            .record_attempt("203.0.113.7", "alice", true)
            .await
            .unwrap();

        let decision = service.check_lockout("203.0.113.7", "alice").await.unwrap();
        assert!(!decision.locked);
        assert_eq!(decision.attempts, 4);
    }

    #[tokio::test]
    async fn test_pairs_are_tracked_separately() {
        let repo = Arc::new(MockAttemptRepository::new());
        let (service, _clock) = service_at(repo, LockoutConfig::default());

        for _ in 0..5 {
            service
                .record_attempt("203.0.113.7", "alice", false)
                .await
                .unwrap();
        }

        // Same account from another origin is unaffected
        let decision = service.check_lockout("198.51.100.2", "alice").await.unwrap();
        assert!(!decision.locked);
        assert_eq!(decision.attempts, 0);

        // Same origin against another account is unaffected
        let decision = service.check_lockout("203.0.113.7", "bob").await.unwrap();
        assert!(!decision.locked);

        let decision = service.check_lockout("203.0.113.7", "alice").await.unwrap();
        assert!(decision.locked);
    }

    #[tokio::test]
    async fn test_old_failures_fall_out_of_the_count() {
        let repo = Arc::new(MockAttemptRepository::new());
        let (service, clock) = service_at(repo, LockoutConfig::default());

        for _ in 0..3 {
            service
                .record_attempt("203.0.113.7", "alice", false)
                .await
                .unwrap();
        }

        clock.advance(Duration::minutes(16));
        for _ in 0..2 {
            service
                .record_attempt("203.0.113.7", "alice", false)
                .await
                .unwrap();
        }

        let decision = service.check_lockout("203.0.113.7", "alice").await.unwrap();
        assert!(!decision.locked);
        assert_eq!(decision.attempts, 2);
    }

    #[tokio::test]
    async fn test_record_stamps_service_clock() {
        let repo = Arc::new(MockAttemptRepository::new());
        let (service, clock) = service_at(repo.clone(), LockoutConfig::default());

        clock.advance(Duration::seconds(42));
        service
            .record_attempt("203.0.113.7", "alice", true)
            .await
            .unwrap();

        let rows = repo.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attempted_at, epoch() + Duration::seconds(42));
        assert!(rows[0].succeeded);
    }

    #[tokio::test]
    async fn test_is_enabled() {
        let repo = Arc::new(MockAttemptRepository::new());

        let enabled = LockoutService::new(repo.clone(), LockoutConfig::default());
        assert!(enabled.is_enabled());

        let disabled = LockoutService::new(repo, LockoutConfig::disabled());
        assert!(!disabled.is_enabled());
    }
}
