//! # Portcullis
//!
//! Portcullis is a login brute force protection library for Rust applications.
//! It keeps a ledger of resolved login attempts keyed by (network origin,
//! account identifier) pairs and locks a pair out once too many failures land
//! inside a sliding window, while attempts from other origins or against
//! other accounts continue unimpeded.
//!
//! What you get:
//! - Pair-based lockout that one shared NAT or one distributed attacker
//!   cannot weaponize against everyone at once
//! - Time-based unlock derived from the ledger, with no lock state to store
//!   or reset
//! - A full audit trail of attempts, successes included
//! - A background sweeper that prunes rows too old to matter
//!
//! ## Storage Support
//!
//! Portcullis currently supports the following storage backends:
//! - SQLite
//!
//! ## Example
//!
//! ```rust,no_run
//! use portcullis::Portcullis;
//! use portcullis_storage_sqlite::SqliteRepositoryProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
//!     let repositories = Arc::new(SqliteRepositoryProvider::new(pool));
//!
//!     let portcullis = Portcullis::new(repositories);
//!     portcullis.migrate().await.unwrap();
//!
//!     let decision = portcullis.check_lockout("203.0.113.7", "alice").await.unwrap();
//!     if !decision.locked {
//!         // verify credentials, then report the outcome
//!         portcullis
//!             .record_attempt("203.0.113.7", "alice", false)
//!             .await
//!             .unwrap();
//!     }
//! }
//! ```
use std::sync::Arc;

use portcullis_core::{
    repositories::{AttemptRepositoryAdapter, RepositoryProvider},
    services::{LockoutService, RetentionSweeper},
};
use tokio::{sync::watch, task::JoinHandle};

/// Re-export core types from portcullis_core
///
/// These types are commonly used when working with the Portcullis API.
pub use portcullis_core::{
    AttemptWindow, Clock, LockoutConfig, LockoutDecision, LoginAttempt, NewLoginAttempt,
    SystemClock, ValidationError,
};

/// Re-export storage backends
///
/// These storage implementations are available when the corresponding feature is enabled.
#[cfg(feature = "sqlite")]
pub use portcullis_storage_sqlite::SqliteRepositoryProvider;

/// Errors that can occur when using Portcullis.
#[derive(Debug, thiserror::Error)]
pub enum PortcullisError {
    /// A lockout key failed validation before reaching storage
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Error when interacting with storage
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<portcullis_core::Error> for PortcullisError {
    fn from(error: portcullis_core::Error) -> Self {
        match error {
            portcullis_core::Error::Validation(e) => {
                PortcullisError::ValidationError(e.to_string())
            }
            other => PortcullisError::StorageError(other.to_string()),
        }
    }
}

/// The main coordinator for login brute force protection.
///
/// `Portcullis` wires the lockout service and the retention sweeper to a
/// repository provider and exposes the small surface a login flow needs:
/// check before verifying credentials, record after, and let the sweeper
/// prune the ledger in the background.
///
/// Construct one instance at startup and share it behind an `Arc`; it holds
/// no global state and two instances over the same database would simply see
/// the same ledger.
///
/// # Example
///
/// ```rust,no_run
/// use portcullis::Portcullis;
/// use portcullis_storage_sqlite::SqliteRepositoryProvider;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = sqlx::SqlitePool::connect("sqlite::memory:").await?;
///     let repositories = Arc::new(SqliteRepositoryProvider::new(pool));
///
///     let portcullis = Portcullis::new(repositories);
///     portcullis.migrate().await?;
///
///     let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
///     let sweeper = portcullis.start_sweeper(shutdown_rx);
///
///     // ... serve logins ...
///
///     shutdown_tx.send(true)?;
///     sweeper.await?;
///     Ok(())
/// }
/// ```
pub struct Portcullis<R: RepositoryProvider> {
    repositories: Arc<R>,
    lockout_service: Arc<LockoutService<AttemptRepositoryAdapter<R>>>,
    sweeper: RetentionSweeper<AttemptRepositoryAdapter<R>>,
    config: LockoutConfig,
}

impl<R: RepositoryProvider> Portcullis<R> {
    /// Create a new Portcullis instance with the default lockout policy.
    ///
    /// # Arguments
    ///
    /// * `repositories` - The repository provider implementation
    pub fn new(repositories: Arc<R>) -> Self {
        Self::with_config(repositories, LockoutConfig::default())
    }

    /// Create a new Portcullis instance with a custom lockout policy.
    ///
    /// The configuration is read here and held for the lifetime of the
    /// instance.
    ///
    /// # Arguments
    ///
    /// * `repositories` - The repository provider implementation
    /// * `config` - Lockout policy to apply
    pub fn with_config(repositories: Arc<R>, config: LockoutConfig) -> Self {
        Self::with_clock(repositories, config, Arc::new(SystemClock))
    }

    /// Create a new Portcullis instance with an injected clock.
    ///
    /// Intended for tests that walk time across window boundaries; production
    /// callers want [`Portcullis::new`] or [`Portcullis::with_config`].
    pub fn with_clock(repositories: Arc<R>, config: LockoutConfig, clock: Arc<dyn Clock>) -> Self {
        let attempt_repo = Arc::new(AttemptRepositoryAdapter::new(repositories.clone()));

        let lockout_service = Arc::new(LockoutService::with_clock(
            attempt_repo.clone(),
            config.clone(),
            clock.clone(),
        ));
        let sweeper = RetentionSweeper::with_clock(attempt_repo, config.clone(), clock);

        Self {
            repositories,
            lockout_service,
            sweeper,
            config,
        }
    }

    /// Get the lockout policy this instance was built with.
    pub fn config(&self) -> &LockoutConfig {
        &self.config
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), PortcullisError> {
        self.repositories
            .migrate()
            .await
            .map_err(|e| PortcullisError::StorageError(e.to_string()))
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), PortcullisError> {
        self.repositories
            .health_check()
            .await
            .map_err(|e| PortcullisError::StorageError(e.to_string()))
    }

    /// Get the current lockout verdict for an (origin, account) pair.
    ///
    /// Call this before verifying credentials and reject the attempt without
    /// touching the password when `decision.locked` is set. The verdict is
    /// derived from the ledger on every call, so a locked pair unlocks by
    /// itself once its last failure ages out.
    ///
    /// # Arguments
    ///
    /// * `origin` - Network origin half of the lockout key
    /// * `account` - Account identifier half of the lockout key
    ///
    /// # Returns
    ///
    /// The [`LockoutDecision`] carrying the lock flag, the in-window failure
    /// count, and the remaining lockout time.
    pub async fn check_lockout(
        &self,
        origin: &str,
        account: &str,
    ) -> Result<LockoutDecision, PortcullisError> {
        let decision = self.lockout_service.check_lockout(origin, account).await?;
        Ok(decision)
    }

    /// Record one resolved login attempt.
    ///
    /// Call this exactly once per attempt that reached credential
    /// verification, whatever the outcome. Do not call it for attempts the
    /// lockout check already rejected; rejected retries must not extend the
    /// lock.
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
    ) -> Result<(), PortcullisError> {
        self.lockout_service
            .record_attempt(origin, account, succeeded)
            .await?;
        Ok(())
    }

    /// Delete ledger rows too old to influence any verdict.
    ///
    /// Runs one sweep immediately and returns how many rows were deleted.
    /// Most callers never need this; [`Portcullis::start_sweeper`] does it on
    /// a schedule.
    pub async fn cleanup_old_attempts(&self) -> Result<u64, PortcullisError> {
        let deleted = self.sweeper.sweep_once().await?;
        Ok(deleted)
    }

    /// Spawn the background retention sweeper.
    ///
    /// The returned handle completes after `shutdown` flips and the sweeper
    /// has wound down.
    ///
    /// # Arguments
    ///
    /// * `shutdown` - Watch receiver the task exits on
    pub fn start_sweeper(&self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        self.sweeper.start(shutdown)
    }
}
