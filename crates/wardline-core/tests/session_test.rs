#![allow(clippy::unwrap_used)]
// Integration tests for `SessionManager` against a wiremock server.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wardline_api::TransportConfig;
use wardline_core::session::SESSION_KEY;
use wardline_core::{
    ApiClient, CoreError, LoginRequest, MemoryStore, PersistentStore, ProfilePatch, Registration,
    SessionManager, SessionStatus,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SessionManager, Arc<MemoryStore>) {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let api = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    let session = SessionManager::with_api(api, store.clone());
    (server, session, store)
}

fn seed(store: &MemoryStore, token: &str) {
    let persisted = json!({ "token": token, "user": { "_id": "u1", "name": "Ann" } });
    store.set(SESSION_KEY, &persisted.to_string()).unwrap();
}

fn login_request(password: &str) -> LoginRequest {
    LoginRequest {
        email: "ann@example.com".into(),
        password: SecretString::from(password.to_owned()),
    }
}

fn token_of(session: &SessionManager) -> Option<String> {
    session
        .snapshot()
        .token()
        .map(|t| t.expose_secret().to_owned())
}

fn persisted(store: &MemoryStore) -> Option<serde_json::Value> {
    store
        .get(SESSION_KEY)
        .map(|raw| serde_json::from_str(&raw).unwrap())
}

async fn mount_login_ok(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": token,
            "user": { "_id": "u1", "name": "Ann", "email": "ann@example.com" }
        })))
        .mount(server)
        .await;
}

// ── Initialization ──────────────────────────────────────────────────

#[tokio::test]
async fn test_starts_initializing_then_anonymous_with_empty_store() {
    let (server, session, _store) = setup().await;
    assert_eq!(session.status(), SessionStatus::Initializing);

    assert_eq!(session.initialize(), SessionStatus::Anonymous);
    assert!(session.identity().is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_initialize_restores_persisted_session_without_network() {
    let (server, session, store) = setup().await;
    seed(&store, "t1");

    assert_eq!(session.initialize(), SessionStatus::Authenticated);
    assert_eq!(token_of(&session).as_deref(), Some("t1"));
    assert_eq!(session.identity().unwrap().name, "Ann");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_persisted_session_is_discarded() {
    let (_server, session, store) = setup().await;
    store.set(SESSION_KEY, "{not json").unwrap();

    assert_eq!(session.initialize(), SessionStatus::Anonymous);
    assert!(store.get(SESSION_KEY).is_none());
}

#[tokio::test]
async fn test_persisted_session_without_user_is_discarded() {
    let (_server, session, store) = setup().await;
    store.set(SESSION_KEY, r#"{"token":"t1"}"#).unwrap();

    assert_eq!(session.initialize(), SessionStatus::Anonymous);
    assert!(session.snapshot().token().is_none());
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_establishes_and_persists_session() {
    let (server, session, store) = setup().await;
    session.initialize();
    mount_login_ok(&server, "t1").await;

    let user = session.login(&login_request("pw")).await.unwrap();

    assert_eq!(user.id, "u1");
    assert_eq!(session.status(), SessionStatus::Authenticated);
    assert_eq!(token_of(&session).as_deref(), Some("t1"));

    let stored = persisted(&store).unwrap();
    assert_eq!(stored["token"], "t1");
    assert_eq!(stored["user"]["id"], "u1");
}

#[tokio::test]
async fn test_requests_after_login_carry_bearer() {
    let (server, session, _store) = setup().await;
    session.initialize();
    mount_login_ok(&server, "t1").await;

    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "_id": "u1", "name": "Ann" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    session.login(&login_request("pw")).await.unwrap();
    session.fetch_profile().await.unwrap();
}

#[tokio::test]
async fn test_rejected_login_leaves_anonymous_session_unchanged() {
    let (server, session, store) = setup().await;
    session.initialize();

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let err = session.login(&login_request("wrong")).await.unwrap_err();

    assert!(matches!(&err, CoreError::Authentication { message } if message == "Invalid credentials"));
    assert_eq!(session.status(), SessionStatus::Anonymous);
    assert!(store.get(SESSION_KEY).is_none());
}

#[tokio::test]
async fn test_rejected_login_keeps_existing_session() {
    let (server, session, store) = setup().await;
    seed(&store, "t1");
    session.initialize();

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    session.login(&login_request("wrong")).await.unwrap_err();

    assert_eq!(token_of(&session).as_deref(), Some("t1"));
    assert_eq!(persisted(&store).unwrap()["token"], "t1");
}

#[tokio::test]
async fn test_login_failure_without_server_message_uses_fallback() {
    let (server, session, _store) = setup().await;
    session.initialize();

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = session.login(&login_request("pw")).await.unwrap_err();
    assert_eq!(err.user_message(), "Login failed");
}

// ── Registration ────────────────────────────────────────────────────

#[tokio::test]
async fn test_register_logs_in_new_account() {
    let (server, session, store) = setup().await;
    session.initialize();

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "fresh",
            "user": { "_id": "u9", "name": "Bo" }
        })))
        .mount(&server)
        .await;

    let user = session
        .register(&Registration {
            name: "Bo".into(),
            email: "bo@example.com".into(),
            password: SecretString::from("pw".to_owned()),
            role: None,
        })
        .await
        .unwrap();

    assert_eq!(user.id, "u9");
    assert_eq!(token_of(&session).as_deref(), Some("fresh"));
    assert_eq!(persisted(&store).unwrap()["token"], "fresh");
}

#[tokio::test]
async fn test_register_conflict_reports_server_message() {
    let (server, session, _store) = setup().await;
    session.initialize();

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "User already exists" })),
        )
        .mount(&server)
        .await;

    let err = session
        .register(&Registration {
            name: "Bo".into(),
            email: "bo@example.com".into(),
            password: SecretString::from("pw".to_owned()),
            role: Some("user".into()),
        })
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "User already exists");
    assert_eq!(session.status(), SessionStatus::Anonymous);
}

// ── Logout ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_logout_clears_session_even_when_server_fails() {
    let (server, session, store) = setup().await;
    seed(&store, "t1");
    session.initialize();

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    session.logout().await;

    assert_eq!(session.status(), SessionStatus::Anonymous);
    assert!(store.get(SESSION_KEY).is_none());
}

#[tokio::test]
async fn test_logout_clears_session_when_server_times_out() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    seed(&store, "t1");
    let transport = TransportConfig {
        timeout: Duration::from_millis(200),
        ..TransportConfig::default()
    };
    let api = ApiClient::new(&server.uri(), &transport).unwrap();
    let session = SessionManager::with_api(api, store.clone());
    session.initialize();

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    session.logout().await;

    assert_eq!(session.status(), SessionStatus::Anonymous);
    assert!(store.get(SESSION_KEY).is_none());
}

#[tokio::test]
async fn test_logout_when_anonymous_is_local_only() {
    let (server, session, _store) = setup().await;
    session.initialize();

    session.logout().await;

    assert_eq!(session.status(), SessionStatus::Anonymous);
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Invalidation ────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_response_tears_session_down() {
    let (server, session, store) = setup().await;
    seed(&store, "t1");
    session.initialize();
    let mut changes = session.subscribe();
    changes.borrow_and_update();

    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
        .mount(&server)
        .await;

    let err = session.fetch_profile().await.unwrap_err();

    assert!(matches!(err, CoreError::AuthorizationExpired));
    assert_eq!(session.status(), SessionStatus::Anonymous);
    assert!(session.identity().is_none());
    assert!(store.get(SESSION_KEY).is_none());
    assert!(changes.has_changed().unwrap());
    assert_eq!(changes.borrow().status(), SessionStatus::Anonymous);
}

#[tokio::test]
async fn test_unauthorized_for_superseded_token_keeps_new_session() {
    let (server, session, store) = setup().await;
    seed(&store, "old");
    session.initialize();

    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    mount_login_ok(&server, "new").await;

    let stale = tokio::spawn({
        let session = session.clone();
        async move { session.fetch_profile().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.login(&login_request("pw")).await.unwrap();

    assert!(stale.await.unwrap().is_err());
    assert_eq!(token_of(&session).as_deref(), Some("new"));
    assert_eq!(persisted(&store).unwrap()["token"], "new");
}

#[tokio::test]
async fn test_on_session_invalidated_is_idempotent() {
    let (_server, session, store) = setup().await;
    seed(&store, "t1");
    session.initialize();

    session.on_session_invalidated();
    session.on_session_invalidated();

    assert_eq!(session.status(), SessionStatus::Anonymous);
    assert!(store.is_empty());
}

// ── Profile ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_profile_replaces_identity() {
    let (server, session, store) = setup().await;
    seed(&store, "t1");
    session.initialize();

    Mock::given(method("PUT"))
        .and(path("/api/users/profile"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "_id": "u1", "name": "Ann B." }
        })))
        .mount(&server)
        .await;

    let patch = ProfilePatch {
        name: Some("Ann B.".into()),
        ..ProfilePatch::default()
    };
    let user = session.update_profile(&patch).await.unwrap();

    assert_eq!(user.name, "Ann B.");
    assert_eq!(session.identity().unwrap().name, "Ann B.");
    assert_eq!(token_of(&session).as_deref(), Some("t1"));
    assert_eq!(persisted(&store).unwrap()["user"]["name"], "Ann B.");
}

#[tokio::test]
async fn test_update_profile_failure_keeps_identity() {
    let (server, session, store) = setup().await;
    seed(&store, "t1");
    session.initialize();

    Mock::given(method("PUT"))
        .and(path("/api/users/profile"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Email already taken" })),
        )
        .mount(&server)
        .await;

    let err = session
        .update_profile(&ProfilePatch {
            email: Some("taken@example.com".into()),
            ..ProfilePatch::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(&err, CoreError::ProfileUpdate { message } if message == "Email already taken"));
    assert_eq!(session.identity().unwrap().name, "Ann");
}

#[tokio::test]
async fn test_update_profile_while_anonymous_makes_no_request() {
    let (server, session, _store) = setup().await;
    session.initialize();

    let err = session
        .update_profile(&ProfilePatch::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ProfileUpdate { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}
