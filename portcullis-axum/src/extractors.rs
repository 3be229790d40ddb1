use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};

use crate::types::AttemptKey;

/// The lockout key the gate attached to this request, if any.
///
/// Present exactly when the gate saw a usable account identifier and let the
/// request through; absent means there is nothing to record.
pub struct OptionalAttemptKey(pub Option<AttemptKey>);

impl<S> FromRequestParts<S> for OptionalAttemptKey
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts.extensions.get::<AttemptKey>().cloned();

        Ok(OptionalAttemptKey(key))
    }
}
