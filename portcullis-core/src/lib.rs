//! Core functionality for the portcullis project
//!
//! This crate contains the storage-agnostic building blocks for login brute
//! force protection: the attempt ledger types, the repository traits a
//! storage backend implements, and the services that derive lockout verdicts
//! and prune expired rows.
//!
//! Protection is keyed by (origin, account) pairs rather than either half
//! alone, so one shared NAT address cannot lock out everyone behind it and
//! one distributed attacker cannot lock out a single account from many
//! addresses at once.
//!
//! See [`LockoutService`] for the verdict logic, [`RetentionSweeper`] for
//! ledger pruning, and [`repositories::RepositoryProvider`] for the contract
//! a storage backend fulfills.

pub mod attempt;
pub mod clock;
pub mod error;
pub mod lockout;
pub mod repositories;
pub mod services;

pub use attempt::{AttemptWindow, LoginAttempt, NewLoginAttempt};
pub use clock::{Clock, SystemClock};
pub use error::{Error, StorageError, ValidationError};
pub use lockout::{LockoutConfig, LockoutDecision};
pub use services::{LockoutService, RetentionSweeper};
