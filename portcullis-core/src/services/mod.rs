//! Service layer for lockout business logic
//!
//! This module contains the concrete services that turn raw attempt rows
//! into lockout verdicts and keep the ledger pruned.

pub mod lockout;
pub mod sweeper;

pub use lockout::LockoutService;
pub use sweeper::RetentionSweeper;
