//! Repository traits for the data access layer
//!
//! This module defines the repository interfaces that services use to
//! interact with storage, as a clean abstraction over the backend.
//!
//! # Trait Hierarchy
//!
//! - [`LoginAttemptRepository`] defines the ledger operations
//! - [`AttemptRepositoryProvider`] provides access to the ledger repository
//! - [`RepositoryProvider`] is a supertrait adding lifecycle methods
//!   (migrations, health checks)
//!
//! Storage backends implement the provider traits once and every service
//! reaches its repository through them.

pub mod adapter;
pub mod attempt;

pub use adapter::AttemptRepositoryAdapter;
pub use attempt::LoginAttemptRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for login attempt repository access.
pub trait AttemptRepositoryProvider: Send + Sync + 'static {
    /// The attempt repository implementation type
    type AttemptRepo: LoginAttemptRepository;

    /// Get the attempt repository
    fn attempts(&self) -> &Self::AttemptRepo;
}

/// Provider trait that storage implementations must implement.
///
/// # Implementing a Custom Storage Backend
///
/// 1. Implement [`LoginAttemptRepository`] for your backend
/// 2. Implement [`AttemptRepositoryProvider`]
/// 3. Implement this trait with `migrate()` and `health_check()`
#[async_trait]
pub trait RepositoryProvider: AttemptRepositoryProvider {
    /// Run migrations for all repositories
    async fn migrate(&self) -> Result<(), Error>;

    /// Health check for all repositories
    async fn health_check(&self) -> Result<(), Error>;
}
