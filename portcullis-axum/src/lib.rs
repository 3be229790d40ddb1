//! # Portcullis Axum Integration
//!
//! This crate provides Axum middleware and extractors for guarding a login
//! route with portcullis brute force protection.
//!
//! The [`lockout_gate`] middleware runs before your login handler: it reads
//! the submitted account identifier out of the JSON body, derives the client
//! origin from `X-Forwarded-For` or the peer address, and rejects the request
//! with `429 Too Many Requests` while that (origin, account) pair is locked
//! out. Requests that pass arrive at your handler with an [`AttemptKey`] in
//! the request extensions; record the outcome against it once the credentials
//! are resolved.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::net::SocketAddr;
//! use std::sync::Arc;
//!
//! use axum::{
//!     Router,
//!     extract::State,
//!     middleware::from_fn_with_state,
//!     routing::post,
//! };
//! use portcullis::Portcullis;
//! use portcullis_axum::{GateState, OptionalAttemptKey, lockout_gate};
//! use portcullis_storage_sqlite::SqliteRepositoryProvider;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = sqlx::SqlitePool::connect("sqlite:auth.db").await.unwrap();
//!     let repositories = Arc::new(SqliteRepositoryProvider::new(pool));
//!
//!     let portcullis = Arc::new(Portcullis::new(repositories));
//!     portcullis.migrate().await.unwrap();
//!
//!     let state = GateState { portcullis };
//!
//!     let app: Router = Router::new()
//!         .route("/login", post(login))
//!         .layer(from_fn_with_state(
//!             state.clone(),
//!             lockout_gate::<SqliteRepositoryProvider>,
//!         ))
//!         .with_state(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(
//!         listener,
//!         app.into_make_service_with_connect_info::<SocketAddr>(),
//!     )
//!     .await
//!     .unwrap();
//! }
//!
//! async fn login(
//!     State(state): State<GateState<SqliteRepositoryProvider>>,
//!     OptionalAttemptKey(key): OptionalAttemptKey,
//! ) -> &'static str {
//!     // ... verify the submitted credentials ...
//!     let succeeded = false;
//!
//!     if let Some(key) = key {
//!         let _ = state
//!             .portcullis
//!             .record_attempt(&key.origin, &key.account, succeeded)
//!             .await;
//!     }
//!
//!     "invalid credentials"
//! }
//! ```

mod error;
mod extractors;
mod middleware;
mod types;

pub use error::{GateError, Result};
pub use extractors::OptionalAttemptKey;
pub use middleware::{GateState, lockout_gate};
pub use types::{AttemptKey, CredentialsPeek};
