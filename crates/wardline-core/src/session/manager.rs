// ── Session lifecycle ──
//
// Owns the authenticated session: restores it from storage, establishes it
// on login/registration, and tears it down on logout or when the server
// rejects the token. The API client reads the token from here on every
// request, so all traffic sees the same session.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use wardline_api::{ApiClient, AuthResponse, LoginRequest, ProfilePatch, Registration, User};

use super::{Credential, PersistedSession, Session, SessionStatus};
use crate::config::ClientConfig;
use crate::error::{CoreError, message_or};
use crate::store::PersistentStore;

/// Storage key holding the serialized credential.
pub const SESSION_KEY: &str = "session";

/// The single owner of session state.
///
/// Cheaply cloneable. Create one per process (or per test) and share it;
/// every clone observes and mutates the same session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
    api: ApiClient,
}

struct SessionInner {
    store: Arc<dyn PersistentStore>,
    state: watch::Sender<Session>,
}

impl SessionManager {
    /// Build a manager with its own API client for `config.api_url`.
    pub fn new(config: &ClientConfig, store: Arc<dyn PersistentStore>) -> Result<Self, CoreError> {
        let api = ApiClient::new(config.api_url.as_str(), &config.transport())?;
        Ok(Self::with_api(api, store))
    }

    /// Wrap an existing client. The client is re-bound to read its bearer
    /// token from this session.
    pub fn with_api(api: ApiClient, store: Arc<dyn PersistentStore>) -> Self {
        let (state, _) = watch::channel(Session::initializing());
        let inner = Arc::new(SessionInner { store, state });
        let api = api.with_token_source(inner.clone());
        Self { inner, api }
    }

    /// The session-bound API client. Requests made through it carry the
    /// current token and tear the session down on a 401.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.state.borrow().status()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn identity(&self) -> Option<User> {
        self.inner.state.borrow().identity().cloned()
    }

    /// Watch every session transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Restore the session from storage. Performs no network I/O.
    ///
    /// Unreadable persisted data is discarded and yields an anonymous session.
    pub fn initialize(&self) -> SessionStatus {
        let restored = self.inner.load();
        let session = match restored {
            Some(credential) => {
                debug!(user = %credential.identity().id, "restored persisted session");
                Session::authenticated(credential)
            }
            None => Session::anonymous(),
        };
        let status = session.status();
        self.inner.state.send_replace(session);
        status
    }

    /// Exchange credentials for a session.
    ///
    /// On failure the previous session (if any) is left untouched.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<User, CoreError> {
        let response = self.api.login(credentials).await.map_err(|e| {
            debug!(error = %e, "login rejected");
            CoreError::Authentication {
                message: message_or(&e, "Login failed"),
            }
        })?;
        let user = self.establish(response)?;
        info!(user = %user.id, "logged in");
        Ok(user)
    }

    /// Create an account and establish a session for it in one step.
    pub async fn register(&self, registration: &Registration) -> Result<User, CoreError> {
        let response = self.api.register(registration).await.map_err(|e| {
            debug!(error = %e, "registration rejected");
            CoreError::Authentication {
                message: message_or(&e, "Registration failed"),
            }
        })?;
        let user = self.establish(response)?;
        info!(user = %user.id, "registered");
        Ok(user)
    }

    /// End the session. Server-side revocation is best effort: local state
    /// is always cleared, even if the request fails or times out.
    pub async fn logout(&self) {
        if self.is_authenticated() {
            if let Err(e) = self.api.logout().await {
                warn!(error = %e, "logout request failed (non-fatal)");
            }
        }
        self.inner.teardown();
        info!("logged out");
    }

    /// Tear the session down without contacting the server. Also invoked
    /// by the API client when the server answers 401 to the current token.
    pub fn on_session_invalidated(&self) {
        self.inner.teardown();
    }

    // ── Profile ──────────────────────────────────────────────────────

    /// Push profile changes and adopt the server's copy of the user.
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<User, CoreError> {
        let Some(token) = self.current_token() else {
            return Err(CoreError::ProfileUpdate {
                message: "Not logged in".into(),
            });
        };

        let user = self.api.update_profile(patch).await.map_err(|e| {
            debug!(error = %e, "profile update rejected");
            CoreError::ProfileUpdate {
                message: message_or(&e, "Profile update failed"),
            }
        })?;
        self.inner.replace_identity(&token, user.clone())?;
        Ok(user)
    }

    /// Reload the identity from the server.
    pub async fn fetch_profile(&self) -> Result<User, CoreError> {
        let Some(token) = self.current_token() else {
            return Err(CoreError::AuthorizationExpired);
        };
        let user = self.api.get_profile().await?;
        self.inner.replace_identity(&token, user.clone())?;
        Ok(user)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn current_token(&self) -> Option<SecretString> {
        self.inner.state.borrow().token().cloned()
    }

    /// Persist and publish a fresh credential in one step.
    fn establish(&self, response: AuthResponse) -> Result<User, CoreError> {
        let user = response.user.clone();
        let credential = Credential::new(SecretString::from(response.token), response.user);

        let mut outcome = Ok(());
        self.inner.state.send_if_modified(|session| {
            match self.inner.write(&credential) {
                Ok(()) => {
                    *session = Session::authenticated(credential);
                    true
                }
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });
        outcome.map(|()| user)
    }
}

impl SessionInner {
    fn load(&self) -> Option<Credential> {
        let raw = self.store.get(SESSION_KEY)?;
        match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(p) if !p.token.is_empty() => Some(Credential::new(SecretString::from(p.token), p.user)),
            Ok(_) => {
                warn!("persisted session has an empty token, discarding");
                self.discard();
                None
            }
            Err(e) => {
                warn!(error = %e, "persisted session is unreadable, discarding");
                self.discard();
                None
            }
        }
    }

    fn discard(&self) {
        if let Err(e) = self.store.remove(SESSION_KEY) {
            warn!(error = %e, "failed to clear persisted session");
        }
    }

    fn write(&self, credential: &Credential) -> Result<(), CoreError> {
        let persisted = PersistedSession {
            token: credential.token().expose_secret().to_owned(),
            user: credential.identity().clone(),
        };
        let raw = serde_json::to_string(&persisted)
            .map_err(|e| CoreError::Internal(format!("serializing session: {e}")))?;
        self.store.set(SESSION_KEY, &raw).map_err(|e| CoreError::Storage {
            message: e.to_string(),
        })
    }

    /// Clear storage and memory. Idempotent.
    fn teardown(&self) {
        self.teardown_if(|_| true);
    }

    /// Tear down only when `guard` accepts the live session; the check and
    /// the transition happen under the same lock.
    fn teardown_if(&self, guard: impl FnOnce(&Session) -> bool) -> bool {
        let mut torn = false;
        self.state.send_if_modified(|session| {
            if !guard(session) {
                return false;
            }
            self.discard();
            torn = true;
            if session.status() == SessionStatus::Anonymous {
                return false;
            }
            *session = Session::anonymous();
            true
        });
        torn
    }

    /// Swap in a new identity, but only if the session that issued the
    /// request (identified by `token`) is still the live one.
    fn replace_identity(&self, token: &SecretString, user: User) -> Result<(), CoreError> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|session| {
            let same = session
                .token()
                .is_some_and(|t| t.expose_secret() == token.expose_secret());
            if !same {
                debug!("session changed while profile request was in flight");
                return false;
            }
            let credential = Credential::new(token.clone(), user);
            match self.write(&credential) {
                Ok(()) => {
                    *session = Session::authenticated(credential);
                    true
                }
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });
        outcome
    }
}

impl wardline_api::TokenSource for SessionInner {
    fn bearer_token(&self) -> Option<SecretString> {
        self.state.borrow().token().cloned()
    }

    fn invalidate(&self, rejected: &SecretString) {
        let torn = self.teardown_if(|session| {
            session
                .token()
                .is_some_and(|t| t.expose_secret() == rejected.expose_secret())
        });
        if torn {
            warn!("server rejected the session token, signed out");
        } else {
            debug!("401 for a token that is no longer current, ignoring");
        }
    }
}
