use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use portcullis::{Portcullis, PortcullisError};
use portcullis_core::repositories::RepositoryProvider;

use crate::{
    error::GateError,
    types::{AttemptKey, CredentialsPeek},
};

/// Login payloads are small; a body past this size is not a credential form
/// and the gate refuses to buffer it.
const MAX_PEEK_BYTES: usize = 64 * 1024;

pub struct GateState<R: RepositoryProvider> {
    pub portcullis: Arc<Portcullis<R>>,
}

impl<R: RepositoryProvider> Clone for GateState<R> {
    fn clone(&self) -> Self {
        Self {
            portcullis: self.portcullis.clone(),
        }
    }
}

/// Middleware guarding a login route with pair-based lockout.
///
/// Buffers the request body, reads the submitted `username`, and checks the
/// (origin, account) pair before the handler runs. Locked pairs get a 429
/// carrying the remaining wait; rejected requests never reach the handler,
/// so they produce no ledger rows and cannot extend the lock. Requests
/// without a usable account identifier pass through ungated.
///
/// When the request proceeds, the checked [`AttemptKey`] is attached to the
/// request extensions and the body is restored for the handler. A ledger
/// failure during the check rejects the request rather than waving it past
/// the gate.
///
/// The check here and the record in the handler are separate operations, so
/// two concurrent requests for the same pair can both pass at one failure
/// below the threshold. The lock lands one request later.
pub async fn lockout_gate<R>(
    State(state): State<GateState<R>>,
    request: Request,
    next: Next,
) -> Result<Response, GateError>
where
    R: RepositoryProvider,
{
    let (mut parts, body) = request.into_parts();

    let origin = client_origin(&parts);

    let bytes = axum::body::to_bytes(body, MAX_PEEK_BYTES)
        .await
        .map_err(|_| GateError::PayloadTooLarge)?;

    let Some(account) = peek_username(&bytes) else {
        // Nothing to key the lockout on
        return Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await);
    };

    let decision = match state.portcullis.check_lockout(&origin, &account).await {
        Ok(decision) => decision,
        Err(PortcullisError::ValidationError(msg)) => return Err(GateError::BadRequest(msg)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to check lockout status");
            return Err(GateError::InternalError(
                "Unable to verify login attempt status".to_string(),
            ));
        }
    };

    if decision.locked {
        tracing::debug!(
            attempts = decision.attempts,
            remaining_ms = decision.remaining_ms(),
            "Rejecting login attempt from locked out pair"
        );
        return Err(GateError::Locked(decision));
    }

    parts.extensions.insert(AttemptKey { origin, account });

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// Best available identifier for where the request came from.
///
/// Takes the first entry of `X-Forwarded-For` when a proxy supplied one,
/// falls back to the peer address, and lastly to a fixed marker so requests
/// with no origin information share one bucket instead of escaping the gate.
fn client_origin(parts: &Parts) -> String {
    if let Some(forwarded) = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|header| header.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn peek_username(bytes: &Bytes) -> Option<String> {
    let peek: CredentialsPeek = serde_json::from_slice(bytes).ok()?;
    let username = peek.username?;
    let username = username.trim();

    if username.is_empty() {
        return None;
    }

    Some(username.to_string())
}
