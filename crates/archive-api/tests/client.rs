//! HTTP behavior tests for the request wrapper, against a mock backend.

use archive_api::{ApiClient, ApiError};
use archive_routes::{NoopNavigator, RecordingNavigator, Route};
use archive_storage::{KeyValueStore, MemoryStore, StorageKeys};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_with_token(
    server: &MockServer,
    token: Option<&str>,
) -> (ApiClient, Arc<MemoryStore>, Arc<RecordingNavigator>) {
    let storage = Arc::new(MemoryStore::new());
    if let Some(token) = token {
        storage.set(StorageKeys::TOKEN, token).unwrap();
        storage.set(StorageKeys::USER, r#"{"id":"alice"}"#).unwrap();
    }
    let navigator = Arc::new(RecordingNavigator::new());
    let client = ApiClient::new(server.uri(), storage.clone(), navigator.clone());
    (client, storage, navigator)
}

#[tokio::test]
async fn attaches_bearer_header_and_body_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ArcTracking/getArcs"))
        .and(header("Authorization", "Bearer tok123"))
        .and(body_partial_json(json!({
            "user": "alice",
            "sessionToken": "tok123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "arcs": ["a1"] })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _, _) = client_with_token(&server, Some("tok123"));
    let arcs = client.get_arcs("alice").await.unwrap();
    assert_eq!(arcs, vec!["a1".to_string()]);
}

#[tokio::test]
async fn session_establishing_calls_omit_body_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Authentication/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": "alice" })))
        .expect(1)
        .mount(&server)
        .await;

    // A stale token is in storage; the authenticate body must not carry it.
    let (client, _, _) = client_with_token(&server, Some("stale"));
    client.authenticate("alice", "pw").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("sessionToken").is_none());
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn requests_without_token_carry_no_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ArcTracking/getArcs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "arcs": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _, _) = client_with_token(&server, None);
    client.get_arcs("alice").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("Authorization").is_none());
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("sessionToken").is_none());
}

#[tokio::test]
async fn unauthorized_clears_session_and_redirects_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ArcTracking/getArcs"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let (client, storage, navigator) = client_with_token(&server, Some("tok123"));
    let result = client.get_arcs("alice").await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(storage.get(StorageKeys::TOKEN).unwrap(), None);
    assert_eq!(storage.get(StorageKeys::USER).unwrap(), None);
    assert_eq!(navigator.routes(), vec![Route::Login]);
}

#[tokio::test]
async fn non_success_status_propagates_to_caller() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ArcTracking/getArc"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let (client, storage, navigator) = client_with_token(&server, Some("tok123"));
    let result = client.get_arc("a1").await;

    match result {
        Err(ApiError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected status error, got {:?}", other.map(|_| ())),
    }
    // Only 401 is a global session invalidation.
    assert_eq!(storage.get(StorageKeys::TOKEN).unwrap(), Some("tok123".to_string()));
    assert!(navigator.routes().is_empty());
}

#[tokio::test]
async fn get_arcs_tolerates_missing_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ArcTracking/getArcs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let (client, _, _) = client_with_token(&server, None);
    assert!(client.get_arcs("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn get_arc_parses_detail_and_absence() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ArcTracking/getArc"))
        .and(body_partial_json(json!({ "arc": "a1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "arc": { "name": "Morning Run", "stat": "Stamina", "streak": 3 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ArcTracking/getArc"))
        .and(body_partial_json(json!({ "arc": "missing" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "arc": null })))
        .mount(&server)
        .await;

    let (client, _, _) = client_with_token(&server, None);

    let arc = client.get_arc("a1").await.unwrap().unwrap();
    assert_eq!(arc.name, "Morning Run");
    assert_eq!(arc.stat, "Stamina");
    assert_eq!(arc.streak, 3);

    assert!(client.get_arc("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn update_arc_streak_defaults_missing_value_to_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ArcTracking/updateArcStreak"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStore::new());
    let client = ApiClient::new(server.uri(), storage, Arc::new(NoopNavigator));
    assert_eq!(client.update_arc_streak("a1").await.unwrap(), 0);
}
