use serde::Deserialize;

/// The lockout key for one login request.
///
/// The gate builds this from the client origin and the submitted account
/// identifier, checks it, and attaches it to the request extensions when the
/// request may proceed. Handlers pull it back out to record the attempt
/// outcome under the same key the gate checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptKey {
    /// Network origin half of the key
    pub origin: String,
    /// Account identifier half of the key
    pub account: String,
}

/// The slice of a login payload the gate reads.
///
/// Unknown fields are ignored; a body that is not JSON or carries no usable
/// `username` leaves the request ungated.
#[derive(Debug, Deserialize)]
pub struct CredentialsPeek {
    #[serde(default)]
    pub username: Option<String>,
}
