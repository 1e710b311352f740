//! API integration tests
//!
//! Router-level tests run over the in-memory backends via `oneshot`; the
//! WebSocket scenarios spin up a real server on an ephemeral port and
//! drive it with a tungstenite client.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::{SinkExt, StreamExt};
use labgest_api::auth::jwt::validate_access_token;
use labgest_api::auth::password::hash_password;
use labgest_api::auth::LoginRequest;
use labgest_api::create_router;
use labgest_api::notify::NotificationBus;
use labgest_api::session::SessionStore;
use labgest_api::state::{AppState, TestBackends};
use labgest_core::{Account, AppConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tower::ServiceExt;

const PASSWORD: &str = "hunter22secret";

fn seeded_state_with_config(config: AppConfig) -> (Arc<AppState>, TestBackends) {
    let (state, backends) = AppState::for_testing_with_config(config);

    backends.accounts.add_account(
        Account {
            id: 1,
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            password_hash: hash_password(PASSWORD).expect("hash"),
        },
        vec!["LAB".to_string()],
    );
    backends.accounts.add_account(
        Account {
            id: 2,
            email: "admin@example.com".to_string(),
            name: "Admin".to_string(),
            password_hash: hash_password(PASSWORD).expect("hash"),
        },
        vec!["ADMIN".to_string()],
    );

    (Arc::new(state), backends)
}

fn seeded_state() -> (Arc<AppState>, TestBackends) {
    seeded_state_with_config(AppConfig::default())
}

fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).expect("body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&body).expect("json body")
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(create_json_request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": email, "password": password })),
        ))
        .await
        .expect("response");

    let status = response.status();
    let body = response_json(response).await;
    (status, body)
}

fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let (state, _) = seeded_state();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

// =============================================================================
// Login and the session store
// =============================================================================

#[tokio::test]
async fn test_login_stores_a_live_session() {
    let (state, backends) = seeded_state();
    let app = create_router(state.clone());

    let (status, body) = login(&app, "ana@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().expect("token").to_string();
    let claims = validate_access_token(&state.config.auth, &token).expect("claims");
    assert_eq!(claims.user_id(), Some(1));
    assert_eq!(claims.profiles, vec!["LAB".to_string()]);

    // The embedded session id is in the store immediately after login.
    backends
        .sessions
        .validate(&claims.session_id, 1)
        .await
        .expect("session live");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let (state, _) = seeded_state();
    let app = create_router(state);

    let (status, body) = login(&app, "ana@example.com", "not-the-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Password is wrong");
}

#[tokio::test]
async fn test_protected_route_without_header() {
    let (state, _) = seeded_state();
    let app = create_router(state);

    let response = app
        .oneshot(create_json_request("GET", "/api/auth/sessions", None))
        .await
        .expect("response");

    // Missing header is a 400, not a 401.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_token_accepted_until_logout() {
    let (state, _) = seeded_state();
    let app = create_router(state);

    let (_, body) = login(&app, "ana@example.com", PASSWORD).await;
    let token = body["token"].as_str().expect("token").to_string();

    // Accepted while the session is live.
    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/auth/validate", &token))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["valid"], true);
    assert_eq!(json["user_id"], 1);

    // Logout revokes the session.
    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/auth/logout", &token))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    // The signature is still fresh, but the gateway now rejects it.
    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/auth/validate", &token))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A second logout with the same token is also rejected at the gate.
    let response = app
        .oneshot(bearer_request("POST", "/api/auth/logout", &token))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_concurrent_logins_are_independent_sessions() {
    let (state, _) = seeded_state();
    let app = create_router(state);

    let (_, body_a) = login(&app, "ana@example.com", PASSWORD).await;
    let (_, body_b) = login(&app, "ana@example.com", PASSWORD).await;
    let token_a = body_a["token"].as_str().expect("token").to_string();
    let token_b = body_b["token"].as_str().expect("token").to_string();
    assert_ne!(token_a, token_b);

    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/auth/sessions", &token_a))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let sessions = response_json(response).await;
    assert_eq!(sessions.as_array().expect("array").len(), 2);

    // Revoking one leaves the other usable.
    let response = app
        .clone()
        .oneshot(bearer_request("POST", "/api/auth/logout", &token_a))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/auth/sessions", &token_b))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let sessions = response_json(response).await;
    assert_eq!(sessions.as_array().expect("array").len(), 1);
}

// =============================================================================
// Profile gate
// =============================================================================

#[tokio::test]
async fn test_profiles_require_admin() {
    let (state, _) = seeded_state();
    let app = create_router(state);

    let (_, body) = login(&app, "ana@example.com", PASSWORD).await;
    let lab_token = body["token"].as_str().expect("token").to_string();

    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/profiles", &lab_token))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unauthenticated requests never reach the profile gate.
    let response = app
        .oneshot(create_json_request("GET", "/api/profiles", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// WebSocket fan-out
// =============================================================================

async fn spawn_server(state: Arc<AppState>) -> std::net::SocketAddr {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    addr
}

#[tokio::test]
async fn test_ws_closed_without_credential() {
    let mut config = AppConfig::default();
    config.auth.ws_auth_grace_secs = 1;
    let (state, backends) = seeded_state_with_config(config);
    let addr = spawn_server(state).await;

    let (mut socket, _) =
        tokio_tungstenite::connect_async(format!("ws://{addr}/api/notifications/live"))
            .await
            .expect("connect");

    // Even a publish inside the grace window must not reach the socket.
    backends
        .notifier
        .publish(1, "should never arrive")
        .await
        .expect("publish");

    // Send no credential: the server must close before any data frame.
    let frame = tokio::time::timeout(Duration::from_secs(3), socket.next())
        .await
        .expect("closed within the grace window");

    match frame {
        None | Some(Err(_)) => {}
        Some(Ok(message)) => {
            assert!(
                matches!(message, WsMessage::Close(_)),
                "expected close, got data frame: {message:?}"
            );
        }
    }
}

#[tokio::test]
async fn test_ws_delivers_after_credential() {
    let (state, backends) = seeded_state();
    let addr = spawn_server(state.clone()).await;

    let token = state
        .auth
        .login(&LoginRequest {
            email: "ana@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .expect("login");

    let (mut socket, _) =
        tokio_tungstenite::connect_async(format!("ws://{addr}/api/notifications/live"))
            .await
            .expect("connect");

    socket
        .send(WsMessage::Text(format!("Bearer {token}")))
        .await
        .expect("send credential");

    // Give the server a beat to authenticate and subscribe.
    tokio::time::sleep(Duration::from_millis(500)).await;

    let payload = r#"{"message":"new piece assigned"}"#;
    backends.notifier.publish(1, payload).await.expect("publish");

    let frame = tokio::time::timeout(Duration::from_secs(3), socket.next())
        .await
        .expect("frame in time")
        .expect("stream open")
        .expect("frame ok");

    match frame {
        WsMessage::Text(text) => {
            // Payloads cross the socket as JSON-wrapped strings.
            let unwrapped: String = serde_json::from_str(&text).expect("json-wrapped string");
            assert_eq!(unwrapped, payload);
        }
        other => panic!("expected text frame, got {other:?}"),
    }
}
