//! Relay tests: the backend router runs on a local port and the relay
//! forwards to it over HTTP

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use library_server::{
    auth::TokenVerifier,
    config::{BackendConfig, RelayConfig},
    relay::{self, BackendClient, RelayState},
};

use common::{app, librarian_token, token, MemoryStore, CLEAN_CODE, SECRET};

/// Serve the backend on an ephemeral port and return its base URL
async fn spawn_backend(store: Arc<MemoryStore>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let backend = app(store);
    tokio::spawn(async move {
        axum::serve(listener, backend).await.unwrap();
    });
    format!("http://{}", addr)
}

fn relay_for(base_url: &str) -> Router {
    let mut config = RelayConfig::default();
    config.auth.jwt_secret = SECRET.to_string();
    config.backend = BackendConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
    };

    let verifier = TokenVerifier::new(&config.auth).unwrap();
    let backend = BackendClient::new(&config.backend).unwrap();

    relay::router(RelayState {
        config: Arc::new(config),
        verifier: Arc::new(verifier),
        backend,
    })
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
    }
    let request = request
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_relay_requires_token() {
    let base_url = spawn_backend(Arc::new(MemoryStore::seeded())).await;
    let relay = relay_for(&base_url);

    let (status, _) = call(&relay, Method::GET, "/api/v1/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&relay, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_relay_forwards_book_search() {
    let base_url = spawn_backend(Arc::new(MemoryStore::seeded())).await;
    let relay = relay_for(&base_url);
    let reader = token("demo_user_1", &[]);

    let (status, body) = call(
        &relay,
        Method::GET,
        "/api/v1/books?searchString=Clean%20Code&size=3",
        Some(&reader),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["size"], 3);
    assert_eq!(body["content"][0]["isbn"], CLEAN_CODE);

    let (status, _) = call(&relay, Method::GET, "/api/v1/books/0000", Some(&reader), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_me_loans_round_trip() {
    let store = Arc::new(MemoryStore::seeded());
    let base_url = spawn_backend(store.clone()).await;
    let relay = relay_for(&base_url);
    let reader = token("demo_user_1", &[]);
    let other = token("demo_user_2", &[]);

    let (status, loan) = call(
        &relay,
        Method::POST,
        "/api/v1/me/loans",
        Some(&reader),
        Some(CLEAN_CODE),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(store.open_loans_for_book(CLEAN_CODE), 1);

    // Backend conflict passes through unchanged
    let (status, body) = call(
        &relay,
        Method::POST,
        "/api/v1/me/loans",
        Some(&other),
        Some(CLEAN_CODE),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Book is already borrowed");

    let (status, me) = call(&relay, Method::GET, "/api/v1/me", Some(&reader), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["userName"], "demo_user_1");
    assert_eq!(me["loans"][0]["id"], loan["id"]);

    // Someone else's loan id through their own /me scope
    let uri = format!("/api/v1/me/loans/{}", loan["id"]);
    let (status, _) = call(&relay, Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&relay, Method::DELETE, &uri, Some(&reader), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(store.open_loans_for_book(CLEAN_CODE), 0);
}

#[tokio::test]
async fn test_admin_routes_leave_authorization_to_backend() {
    let base_url = spawn_backend(Arc::new(MemoryStore::seeded())).await;
    let relay = relay_for(&base_url);

    let reader = token("demo_user_1", &[]);
    let (status, _) = call(&relay, Method::GET, "/api/v1/admin/users", Some(&reader), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, page) = call(
        &relay,
        Method::GET,
        "/api/v1/admin/users",
        Some(&librarian_token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalElements"], 3);

    let (status, user) = call(
        &relay,
        Method::GET,
        "/api/v1/admin/users/demo_user_2",
        Some(&librarian_token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["userName"], "demo_user_2");
    assert_eq!(user["loans"], serde_json::json!([]));
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let relay = relay_for(&format!("http://{}", addr));
    let reader = token("demo_user_1", &[]);

    let (status, body) = call(&relay, Method::GET, "/api/v1/books", Some(&reader), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "UpstreamFailure");
}
