#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use wardline_api::{
    ApiClient, Error, HospitalDraft, LoginRequest, ProfilePatch, SearchFilter, TokenSource,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Token source that records invalidations.
#[derive(Default)]
struct FakeTokens {
    token: Mutex<Option<String>>,
    invalidated: Mutex<Vec<String>>,
}

impl FakeTokens {
    fn with_token(token: &str) -> Arc<Self> {
        let tokens = Self::default();
        *tokens.token.lock().unwrap() = Some(token.into());
        Arc::new(tokens)
    }
}

impl TokenSource for FakeTokens {
    fn bearer_token(&self) -> Option<SecretString> {
        self.token.lock().unwrap().clone().map(SecretString::from)
    }

    fn invalidate(&self, rejected: &SecretString) {
        self.invalidated
            .lock()
            .unwrap()
            .push(rejected.expose_secret().to_owned());
        *self.token.lock().unwrap() = None;
    }
}

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

async fn setup_with_tokens(tokens: Arc<FakeTokens>) -> (MockServer, ApiClient) {
    let (server, client) = setup().await;
    (server, client.with_token_source(tokens))
}

fn hospital_json(id: &str, name: &str, city: &str) -> serde_json::Value {
    json!({ "_id": id, "name": name, "city": city, "rating": 4.0, "speciality": [] })
}

// ── Bearer attachment ───────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_attached_when_token_present() {
    let tokens = FakeTokens::with_token("t1");
    let (server, client) = setup_with_tokens(tokens).await;

    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "_id": "u1", "name": "Ann" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let user = client.get_profile().await.unwrap();
    assert_eq!(user.id, "u1");
}

#[tokio::test]
async fn test_bearer_omitted_without_token() {
    let (server, client) = setup_with_tokens(Arc::new(FakeTokens::default())).await;

    Mock::given(method("GET"))
        .and(path("/api/hospitals"))
        .respond_with(move |req: &Request| {
            assert!(!req.headers.contains_key("authorization"));
            ResponseTemplate::new(200).set_body_json(json!({
                "data": [],
                "pagination": { "totalPages": 0 }
            }))
        })
        .expect(1)
        .mount(&server)
        .await;

    let page = client.list_hospitals(1, 12, None).await.unwrap();
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_token_is_read_per_request() {
    let tokens = FakeTokens::with_token("first");
    let (server, client) = setup_with_tokens(Arc::clone(&tokens)).await;

    Mock::given(method("GET"))
        .and(path("/api/users/profile"))
        .and(header("authorization", "Bearer second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u2" })))
        .expect(1)
        .mount(&server)
        .await;

    *tokens.token.lock().unwrap() = Some("second".into());
    let user = client.get_profile().await.unwrap();
    assert_eq!(user.id, "u2");
}

#[tokio::test]
async fn test_login_never_sends_bearer() {
    let tokens = FakeTokens::with_token("stale");
    let (server, client) = setup_with_tokens(tokens).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(move |req: &Request| {
            assert!(!req.headers.contains_key("authorization"));
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
            assert_eq!(body["email"], "ann@example.com");
            assert_eq!(body["password"], "hunter2");
            ResponseTemplate::new(200).set_body_json(json!({
                "token": "fresh",
                "user": { "_id": "u1", "name": "Ann", "role": "admin" }
            }))
        })
        .mount(&server)
        .await;

    let resp = client
        .login(&LoginRequest {
            email: "ann@example.com".into(),
            password: SecretString::from("hunter2".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(resp.token, "fresh");
    assert_eq!(resp.user.role.as_deref(), Some("admin"));
}

// ── 401 interception ────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_with_token_invalidates_before_returning() {
    let tokens = FakeTokens::with_token("expired");
    let (server, client) = setup_with_tokens(Arc::clone(&tokens)).await;

    Mock::given(method("GET"))
        .and(path("/api/hospitals"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })),
        )
        .mount(&server)
        .await;

    let result = client.list_hospitals(1, 12, None).await;

    match result {
        Err(Error::Unauthorized { message }) => {
            assert_eq!(message.as_deref(), Some("Token expired"));
        }
        other => panic!("expected Unauthorized, got: {other:?}"),
    }
    assert_eq!(*tokens.invalidated.lock().unwrap(), vec!["expired".to_string()]);
    assert!(tokens.bearer_token().is_none());
}

#[tokio::test]
async fn test_unauthorized_login_does_not_invalidate() {
    let tokens = FakeTokens::with_token("keep-me");
    let (server, client) = setup_with_tokens(Arc::clone(&tokens)).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let err = client
        .login(&LoginRequest {
            email: "ann@example.com".into(),
            password: SecretString::from("wrong".to_string()),
        })
        .await
        .unwrap_err();

    assert_eq!(err.server_message(), Some("Invalid credentials"));
    assert!(tokens.invalidated.lock().unwrap().is_empty());
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_carries_status_and_message() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/hospitals/h9"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Hospital not found" })),
        )
        .mount(&server)
        .await;

    let err = client.delete_hospital("h9").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.server_message(), Some("Hospital not found"));
}

#[tokio::test]
async fn test_non_json_error_body_has_no_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/specialties"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client.list_specialties().await.unwrap_err();
    assert!(matches!(err, Error::Http { status: 502, message: None }));
}

#[tokio::test]
async fn test_malformed_success_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/hospitals"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.list_hospitals(1, 12, None).await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization, got: {other:?}"),
    }
}

// ── Hospitals ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_hospitals_sends_page_limit_and_filter() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/hospitals"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "12"))
        .and(query_param("city", "NYC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [hospital_json("h1", "Bellevue", "NYC")],
            "pagination": { "totalPages": 3, "currentPage": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = SearchFilter {
        param: "city",
        value: "NYC",
    };
    let page = client.list_hospitals(2, 12, Some(filter)).await.unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].name, "Bellevue");
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.pagination.current_page, Some(2));
}

#[tokio::test]
async fn test_filter_is_sent_as_typed() {
    let (server, client) = setup().await;

    for value in [" New York ", "   "] {
        Mock::given(method("GET"))
            .and(path("/api/hospitals"))
            .and(query_param("city", value))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;
    }

    for value in [" New York ", "   "] {
        let filter = SearchFilter {
            param: "city",
            value,
        };
        client.list_hospitals(1, 12, Some(filter)).await.unwrap();
    }
}

#[tokio::test]
async fn test_empty_filter_is_not_sent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/hospitals"))
        .respond_with(move |req: &Request| {
            assert!(!req.url.query_pairs().any(|(k, _)| k == "city"));
            ResponseTemplate::new(200).set_body_json(json!({ "data": [] }))
        })
        .mount(&server)
        .await;

    let filter = SearchFilter {
        param: "city",
        value: "",
    };
    client.list_hospitals(1, 12, Some(filter)).await.unwrap();
}

#[tokio::test]
async fn test_create_and_get_hospital() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/hospitals"))
        .respond_with(move |req: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
            assert_eq!(body, json!({ "name": "Mercy", "city": "Austin" }));
            ResponseTemplate::new(201).set_body_json(json!({
                "data": hospital_json("h7", "Mercy", "Austin")
            }))
        })
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/hospitals/h7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(hospital_json("h7", "Mercy", "Austin")),
        )
        .mount(&server)
        .await;

    let draft = HospitalDraft {
        name: Some("Mercy".into()),
        city: Some("Austin".into()),
        ..HospitalDraft::default()
    };
    let created = client.create_hospital(&draft).await.unwrap();
    let fetched = client.get_hospital("h7").await.unwrap();

    assert_eq!(created, fetched);
}

#[tokio::test]
async fn test_delete_accepts_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/hospitals/h1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client.delete_hospital("h1").await.unwrap();
}

#[tokio::test]
async fn test_hospital_id_stays_one_path_segment() {
    let (server, client) = setup().await;

    Mock::given(path("/api/users/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(move |req: &Request| {
            assert_eq!(req.url.path(), "/api/hospitals/..%2Fusers%2Fprofile%3Fa=1");
            assert_eq!(req.url.query(), None);
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Hospital not found" }))
        })
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/hospitals/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hospital_json("a/b", "X", "Y")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/hospitals/a%2Fb%23c"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get_hospital("../users/profile?a=1").await.unwrap_err();
    assert!(err.is_not_found());

    let updated = client
        .update_hospital("a/b", &HospitalDraft::default())
        .await
        .unwrap();
    assert_eq!(updated.id, "a/b");

    client.delete_hospital("a/b#c").await.unwrap();
}

#[tokio::test]
async fn test_dot_segment_id_is_refused_without_a_request() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(0)
        .mount(&server)
        .await;

    for id in ["..", ".", ""] {
        let err = client.get_hospital(id).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPathSegment { .. }), "{id:?}");
    }
}

#[tokio::test]
async fn test_search_uses_query_param() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("query", "cardio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [hospital_json("h2", "Heart Center", "Denver")]
        })))
        .mount(&server)
        .await;

    let results = client.search_hospitals("cardio").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].city, "Denver");
}

// ── Profile ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_profile_sends_only_set_fields() {
    let tokens = FakeTokens::with_token("t1");
    let (server, client) = setup_with_tokens(tokens).await;

    Mock::given(method("PUT"))
        .and(path("/api/users/profile"))
        .respond_with(move |req: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
            assert_eq!(body, json!({ "name": "Ann B." }));
            ResponseTemplate::new(200).set_body_json(json!({ "_id": "u1", "name": "Ann B." }))
        })
        .mount(&server)
        .await;

    let patch = ProfilePatch {
        name: Some("Ann B.".into()),
        ..ProfilePatch::default()
    };
    let user = client.update_profile(&patch).await.unwrap();
    assert_eq!(user.name, "Ann B.");
}
