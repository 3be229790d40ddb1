//! Background retention sweeper for the login attempt ledger.
//!
//! Attempt rows only influence lockout decisions while they sit inside the
//! sliding window, so anything older is dead weight. The sweeper deletes
//! those rows on a fixed schedule to keep the ledger from growing without
//! bound.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{
    Error,
    clock::{Clock, SystemClock},
    lockout::LockoutConfig,
    repositories::LoginAttemptRepository,
};

/// Periodically deletes attempt rows that have aged out of the lockout
/// window.
///
/// The sweep is an availability concern, not a correctness one: the window
/// predicate already ignores expired rows, so a missed sweep never changes
/// a verdict. Failures are logged and the next tick tries again.
pub struct RetentionSweeper<R: LoginAttemptRepository> {
    repository: Arc<R>,
    config: LockoutConfig,
    clock: Arc<dyn Clock>,
}

impl<R: LoginAttemptRepository> RetentionSweeper<R> {
    /// Create a new RetentionSweeper reading time from the system clock.
    pub fn new(repository: Arc<R>, config: LockoutConfig) -> Self {
        Self::with_clock(repository, config, Arc::new(SystemClock))
    }

    /// Create a new RetentionSweeper with an injected clock.
    pub fn with_clock(repository: Arc<R>, config: LockoutConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            config,
            clock,
        }
    }

    /// Run a single sweep, returning how many rows were deleted.
    ///
    /// Deletes every row strictly older than `now - window`, successes and
    /// failures alike, across all (origin, account) pairs.
    pub async fn sweep_once(&self) -> Result<u64, Error> {
        let cutoff = self.clock.now() - self.config.window;
        self.repository.delete_older_than(cutoff).await
    }

    /// Spawns a background task that sweeps on a fixed interval.
    ///
    /// The task runs until `shutdown` flips; await the returned handle to
    /// wait for it to wind down. A failed sweep is logged and retried on
    /// the next tick.
    pub fn start(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let repository = self.repository.clone();
        let config = self.config.clone();
        let clock = self.clock.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.sweep_interval);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let cutoff = clock.now() - config.window;
                        match repository.delete_older_than(cutoff).await {
                            Ok(count) => {
                                if count > 0 {
                                    tracing::info!(count, "Swept expired login attempt records");
                                }
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to sweep expired login attempt records");
                            }
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down login attempt retention sweeper");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::{AttemptWindow, LoginAttempt, NewLoginAttempt};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::Mutex;

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

    struct FixedClock {
        now: DateTime<Utc>,
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.now
        }
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    async fn seed(repo: &MockAttemptRepository, at: DateTime<Utc>, succeeded: bool) {
        repo.insert(&NewLoginAttempt::new("203.0.113.7", "alice", at, succeeded))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sweep_once_deletes_only_expired_rows() {
        let repo = Arc::new(MockAttemptRepository::new());
        seed(&repo, epoch(), false).await;
        seed(&repo, epoch() + Duration::minutes(10), true).await;

        let clock = Arc::new(FixedClock {
            now: epoch() + Duration::minutes(15) + Duration::milliseconds(1),
        });
        let sweeper = RetentionSweeper::with_clock(repo.clone(), LockoutConfig::default(), clock);

        let deleted = sweeper.sweep_once().await.unwrap();
        assert_eq!(deleted, 1);

        let rows = repo.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attempted_at, epoch() + Duration::minutes(10));
    }

    #[tokio::test]
    async fn test_sweep_once_keeps_rows_exactly_at_the_cutoff() {
        let repo = Arc::new(MockAttemptRepository::new());
        seed(&repo, epoch(), false).await;

        let clock = Arc::new(FixedClock {
            now: epoch() + Duration::minutes(15),
        });
        let sweeper = RetentionSweeper::with_clock(repo.clone(), LockoutConfig::default(), clock);

        let deleted = sweeper.sweep_once().await.unwrap();
        assert_eq!(deleted, 0);
        assert_eq!(repo.rows().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_sweeps_on_schedule() {
        let repo = Arc::new(MockAttemptRepository::new());
        seed(&repo, epoch() - Duration::hours(2), false).await;
        seed(&repo, epoch() - Duration::hours(1), true).await;

        let clock = Arc::new(FixedClock { now: epoch() });
        let sweeper = RetentionSweeper::with_clock(repo.clone(), LockoutConfig::default(), clock);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = sweeper.start(shutdown_rx);

        // The first tick fires as soon as the task starts
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        assert!(repo.rows().is_empty());

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_stops_on_shutdown() {
        let repo = Arc::new(MockAttemptRepository::new());

        let clock = Arc::new(FixedClock { now: epoch() });
        let sweeper = RetentionSweeper::with_clock(repo.clone(), LockoutConfig::default(), clock);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = sweeper.start(shutdown_rx);

        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        // The loop is gone; rows seeded afterwards stay put however far
        // time advances
        seed(&repo, epoch() - Duration::hours(5), false).await;
        tokio::time::sleep(std::time::Duration::from_secs(7200)).await;
        assert_eq!(repo.rows().len(), 1);
    }
}
