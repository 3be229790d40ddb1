//! SQLite storage backend for the portcullis project
//!
//! Persists the login attempt ledger in a single `login_attempts` table,
//! indexed by (origin, account, attempted_at) so the hot window query never
//! scans. Schema changes ship as versioned migrations applied through
//! [`migrations::SqliteMigrationManager`].
//!
//! The entry point is [`SqliteRepositoryProvider`], which implements the
//! provider contract from `portcullis-core` over a `sqlx` connection pool.

pub mod migrations;
pub mod repositories;

pub use repositories::{SqliteAttemptRepository, SqliteRepositoryProvider};
