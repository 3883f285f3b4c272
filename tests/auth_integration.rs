//! Auth bridge flows against a live mock backend.

mod common;

use axum::{http::StatusCode, response::IntoResponse, Json};
use common::{client, config_for, set_cookie, set_cookies, start_gateway, unreachable_url, MockBackend};
use serde_json::{json, Value};

fn login_backend() -> impl Fn(&common::Recorded) -> axum::response::Response {
    |seen| {
        let body = seen.json();
        if body["password"] == "secret" {
            (
                [("set-cookie", "backend_pref=1; Path=/")],
                Json(json!({
                    "message": "Login successful",
                    "user": {"id": 7, "username": "a@b.com", "token": "tok123"}
                })),
            )
                .into_response()
        } else {
            (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid credentials"}))).into_response()
        }
    }
}

#[tokio::test]
async fn test_login_sets_session_cookies() {
    let backend = MockBackend::start(login_backend()).await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    let response = client()
        .post(gateway.url("/api/auth/login"))
        .json(&json!({"email": "a@b.com", "password": "secret"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let cookies = set_cookies(&response);
    let session = set_cookie(&cookies, "session").unwrap();
    let user_id = set_cookie(&cookies, "user_id").unwrap();
    assert!(session.starts_with("session=tok123;"));
    assert!(user_id.starts_with("user_id=7;"));
    for cookie in [session, user_id] {
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
    }
    assert!(set_cookie(&cookies, "backend_pref").is_some());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["id"], 7);
    assert_eq!(body["user"]["email"], "a@b.com");

    let seen = backend.last();
    assert_eq!(seen.uri, "/api/auth/login");
    assert_eq!(seen.json(), json!({"email": "a@b.com", "password": "secret"}));
}

#[tokio::test]
async fn test_login_backend_error_sets_no_cookies() {
    let backend = MockBackend::start(login_backend()).await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    let response = client()
        .post(gateway.url("/api/auth/login"))
        .json(&json!({"email": "a@b.com", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert!(set_cookies(&response).is_empty());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_non_json_failure_uses_status_text() {
    let backend = MockBackend::start(|_| (StatusCode::BAD_GATEWAY, "upstream down").into_response()).await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    let response = client()
        .post(gateway.url("/api/auth/login"))
        .json(&json!({"email": "a@b.com", "password": "secret"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Login failed");
    assert_eq!(body["error"], "Server responded with status: 502 Bad Gateway");
}

#[tokio::test]
async fn test_login_unreachable_backend() {
    let gateway = start_gateway(config_for(&unreachable_url().await)).await;

    let response = client()
        .post(gateway.url("/api/auth/login"))
        .json(&json!({"email": "a@b.com", "password": "secret"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    assert!(set_cookies(&response).is_empty());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Login failed");
}

#[tokio::test]
async fn test_logout_forwards_session_and_clears_cookies() {
    let backend = MockBackend::start(|_| Json(json!({"message": "Logged out"})).into_response()).await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    let response = client()
        .delete(gateway.url("/api/auth/logout"))
        .header("cookie", "session=tok123; user_id=7")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let cookies = set_cookies(&response);
    assert!(set_cookie(&cookies, "session").unwrap().contains("Max-Age=0"));
    assert!(set_cookie(&cookies, "user_id").unwrap().contains("Max-Age=0"));

    let seen = backend.last();
    assert_eq!(seen.method, "DELETE");
    assert_eq!(seen.uri, "/api/auth/logout");
    assert_eq!(seen.header("x-session-id"), Some("tok123"));
    assert_eq!(seen.header("x-user-id"), Some("7"));
}

#[tokio::test]
async fn test_logout_clears_cookies_when_backend_is_down() {
    let gateway = start_gateway(config_for(&unreachable_url().await)).await;

    let response = client()
        .delete(gateway.url("/api/auth/logout"))
        .header("cookie", "session=tok123; user_id=7")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    let cookies = set_cookies(&response);
    assert!(set_cookie(&cookies, "session").is_some());
    assert!(set_cookie(&cookies, "user_id").is_some());
}

#[tokio::test]
async fn test_logout_relays_backend_rejection() {
    let backend = MockBackend::start(|_| {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid session"}))).into_response()
    })
    .await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    let response = client()
        .delete(gateway.url("/api/auth/logout"))
        .header("cookie", "session=old; user_id=7")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    assert_eq!(set_cookies(&response).len(), 2);
}

#[tokio::test]
async fn test_me_rejected_returns_401_and_clears() {
    let backend = MockBackend::start(|_| {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid session"}))).into_response()
    })
    .await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    let response = client()
        .get(gateway.url("/api/auth/me"))
        .header("cookie", "session=old; user_id=7")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let cookies = set_cookies(&response);
    assert!(set_cookie(&cookies, "session").is_some());
    assert!(set_cookie(&cookies, "user_id").is_some());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid session");
}

#[tokio::test]
async fn test_me_rejected_navigation_redirects_to_login() {
    let backend = MockBackend::start(|_| StatusCode::UNAUTHORIZED.into_response()).await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    let response = client()
        .get(gateway.url("/api/auth/me"))
        .header("accept", "text/html")
        .header("cookie", "session=old; user_id=7")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()["location"], "/login");
    assert_eq!(set_cookies(&response).len(), 2);
}

#[tokio::test]
async fn test_me_bootstraps_user_id_cookie() {
    let backend = MockBackend::start(|_| {
        Json(json!({"user": {"id": 42, "email": "a@b.com"}})).into_response()
    })
    .await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    let response = client()
        .get(gateway.url("/api/auth/me"))
        .header("cookie", "session=tok123")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let cookies = set_cookies(&response);
    assert!(set_cookie(&cookies, "user_id").unwrap().starts_with("user_id=42;"));

    let response = client()
        .get(gateway.url("/api/auth/me"))
        .header("cookie", "session=tok123; user_id=42")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(set_cookies(&response).is_empty());

    let seen = backend.last();
    assert_eq!(seen.uri, "/api/auth/me");
    assert_eq!(seen.header("x-session-id"), Some("tok123"));
}

#[tokio::test]
async fn test_register_relays_success() {
    let backend = MockBackend::start(|_| {
        (
            StatusCode::CREATED,
            Json(json!({"message": "User registered successfully", "user_id": 3, "token": "t"})),
        )
            .into_response()
    })
    .await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    let response = client()
        .post(gateway.url("/api/auth/register"))
        .json(&json!({"email": "new@b.com", "password": "pw"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(set_cookies(&response).is_empty());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user_id"], 3);
    assert_eq!(backend.last().uri, "/api/auth/register");
}

#[tokio::test]
async fn test_register_backend_error() {
    let backend = MockBackend::start(|_| {
        (StatusCode::CONFLICT, Json(json!({"error": "Email already registered"}))).into_response()
    })
    .await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    let response = client()
        .post(gateway.url("/api/auth/register"))
        .json(&json!({"email": "a@b.com", "password": "pw"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Registration failed");
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn test_register_requires_credentials() {
    let backend = MockBackend::start(|_| StatusCode::OK.into_response()).await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    let response = client()
        .post(gateway.url("/api/auth/register"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_login_session_cookie_wins_over_backend_cookie() {
    let backend = MockBackend::start(|_| {
        (
            [("set-cookie", "session=flask-signed-blob; Path=/; HttpOnly")],
            Json(json!({"user": {"id": 7, "token": "tok123"}})),
        )
            .into_response()
    })
    .await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    let response = client()
        .post(gateway.url("/api/auth/login"))
        .json(&json!({"email": "a@b.com", "password": "secret"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let cookies = set_cookies(&response);
    let last_session = cookies
        .iter()
        .filter(|c| c.starts_with("session="))
        .last()
        .unwrap();
    assert!(last_session.starts_with("session=tok123;"), "{cookies:?}");
}

#[tokio::test]
async fn test_bodiless_backend_calls_send_no_content_type() {
    let backend = MockBackend::start(|_| Json(json!({"user": {"id": 7, "token": "t"}})).into_response()).await;
    let gateway = start_gateway(config_for(&backend.url)).await;

    client()
        .get(gateway.url("/api/auth/me"))
        .header("cookie", "session=tok123; user_id=7")
        .send()
        .await
        .unwrap();
    let seen = backend.last();
    assert_eq!(seen.method, "GET");
    assert!(seen.header("content-type").is_none());
    assert_eq!(seen.header("accept"), Some("application/json"));

    client()
        .delete(gateway.url("/api/auth/logout"))
        .header("cookie", "session=tok123; user_id=7")
        .send()
        .await
        .unwrap();
    assert!(backend.last().header("content-type").is_none());

    client()
        .post(gateway.url("/api/auth/login"))
        .json(&json!({"email": "a@b.com", "password": "secret"}))
        .send()
        .await
        .unwrap();
    assert_eq!(backend.last().header("content-type"), Some("application/json"));
}
