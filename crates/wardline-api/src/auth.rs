use secrecy::SecretString;

/// Where the client gets its bearer credential from.
///
/// The client never caches a token: it asks the source on every request, so
/// a login or logout elsewhere is visible on the very next call. The session
/// layer is the only implementor in practice.
pub trait TokenSource: Send + Sync {
    /// The token to attach right now, if any.
    fn bearer_token(&self) -> Option<SecretString>;

    /// Called when the server rejected `rejected` with a 401, before the
    /// error reaches the caller. Implementations must not fail.
    fn invalidate(&self, rejected: &SecretString);
}

/// Whether a request should carry the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bearer {
    /// Attach the current token when one exists.
    Session,
    /// Never attach a token (login, registration).
    Omit,
}
