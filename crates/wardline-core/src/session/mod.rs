// ── Authenticated session ──
//
// A session is either still loading from storage, anonymous, or holds a
// credential (token + identity). The token and identity only ever travel
// together, so "logged in without a user" cannot be represented.

mod manager;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use wardline_api::User;

pub use manager::{SESSION_KEY, SessionManager};

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    /// Persisted state has not been read yet.
    Initializing,
    Anonymous,
    Authenticated,
}

/// Bearer token plus the identity it belongs to.
#[derive(Debug, Clone)]
pub struct Credential {
    token: SecretString,
    identity: User,
}

impl Credential {
    pub fn new(token: SecretString, identity: User) -> Self {
        Self { token, identity }
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn identity(&self) -> &User {
        &self.identity
    }
}

/// Snapshot of the session as observed by consumers.
#[derive(Debug, Clone)]
pub struct Session {
    status: SessionStatus,
    credential: Option<Credential>,
}

impl Session {
    pub(crate) fn initializing() -> Self {
        Self {
            status: SessionStatus::Initializing,
            credential: None,
        }
    }

    pub(crate) fn anonymous() -> Self {
        Self {
            status: SessionStatus::Anonymous,
            credential: None,
        }
    }

    pub(crate) fn authenticated(credential: Credential) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            credential: Some(credential),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn identity(&self) -> Option<&User> {
        self.credential.as_ref().map(Credential::identity)
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.credential.as_ref().map(Credential::token)
    }
}

/// On-disk form of a credential, stored under a single key so token and
/// identity are written in one step.
#[derive(Serialize, Deserialize)]
pub(crate) struct PersistedSession {
    pub(crate) token: String,
    pub(crate) user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".into(),
            name: "Ann".into(),
            email: None,
            role: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn token_and_identity_travel_together() {
        assert!(Session::anonymous().token().is_none());
        assert!(Session::anonymous().identity().is_none());
        assert!(Session::initializing().credential().is_none());

        let s = Session::authenticated(Credential::new(SecretString::from("t1".to_owned()), user()));
        assert!(s.is_authenticated());
        assert!(s.token().is_some());
        assert_eq!(s.identity().map(|u| u.id.as_str()), Some("u1"));
    }

    #[test]
    fn status_displays_lowercase() {
        assert_eq!(SessionStatus::Authenticated.to_string(), "authenticated");
    }
}
