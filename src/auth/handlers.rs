//! Login, logout, register and current-user handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{ACCEPT, SET_COOKIE},
        HeaderMap, Method, StatusCode,
    },
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::Value;

use crate::auth::types::{error_text, has_error, id_string, Credentials};
use crate::http::request::{propagate_request_id, request_id};
use crate::http::response::{raw_response, status_error, ApiError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::upstream::{BufferedResponse, UpstreamError};
use crate::session::cookies::{append_set_cookies, cookie_value};
use crate::session::{inject_session_headers, SessionCookies, SESSION_COOKIE, USER_ID_COOKIE};

/// `POST /api/auth/login`
pub async fn login(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let credentials = match Credentials::parse(&body) {
        Ok(c) => c,
        Err(e) => return ApiError::bad_request("Login failed").with_error(e).into_response(),
    };

    let reply = match call_backend(&state, &headers, Method::POST, "/auth/login", false, Some(&credentials)).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(request_id = %request_id(&headers), error = %e, "Login error");
            metrics::record_auth_event("login", "error");
            return ApiError::internal("Login failed").with_error(e.to_string()).into_response();
        }
    };

    let Some(mut result) = reply.json() else {
        metrics::record_auth_event("login", "rejected");
        return ApiError::bad_request("Login failed")
            .with_error(status_error(reply.status))
            .into_response();
    };

    if has_error(&result) || !reply.status.is_success() {
        tracing::info!(request_id = %request_id(&headers), status = %reply.status, "Login rejected by backend");
        metrics::record_auth_event("login", "rejected");
        return (StatusCode::BAD_REQUEST, Json(result)).into_response();
    }

    let mut cookies = Vec::new();
    if let Some(user) = result.get_mut("user").and_then(Value::as_object_mut) {
        let id = user.get("id").and_then(id_string);
        let token = user.get("token").and_then(Value::as_str).map(str::to_owned);
        match (id, token) {
            (Some(id), Some(token)) => {
                cookies.push(state.session.issue(USER_ID_COOKIE, id));
                cookies.push(state.session.issue(SESSION_COOKIE, token));
            }
            (Some(_), None) => {
                tracing::warn!("Backend login reply has no session token; no cookies set");
            }
            _ => {}
        }

        if !user.contains_key("email") {
            if let Some(username) = user.get("username").cloned() {
                user.insert("email".to_string(), username);
            }
        }
    }

    metrics::record_auth_event("login", if cookies.is_empty() { "no_session" } else { "success" });

    // Backend cookies first: a same-named backend cookie must not replace ours.
    let mut response = Json(result).into_response();
    forward_set_cookies(&reply, &mut response);
    append_set_cookies(response.headers_mut(), &cookies);
    response
}

/// `DELETE /api/auth/logout`
///
/// The session cookies are cleared whatever the backend says.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut response = match call_backend::<Value>(&state, &headers, Method::DELETE, "/auth/logout", true, None).await {
        Ok(reply) => {
            metrics::record_auth_event("logout", if reply.status.is_success() { "success" } else { "rejected" });
            let mut response = relay(&reply, reply.status);
            forward_set_cookies(&reply, &mut response);
            response
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id(&headers), error = %e, "Logout error; clearing cookies anyway");
            metrics::record_auth_event("logout", "error");
            ApiError::internal("Logout failed").with_error(e.to_string()).into_response()
        }
    };

    append_set_cookies(response.headers_mut(), &state.session.clear_session());
    response
}

/// `GET /api/auth/me`
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let reply = match call_backend::<Value>(&state, &headers, Method::GET, "/auth/me", true, None).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(request_id = %request_id(&headers), error = %e, "Error fetching current user");
            metrics::record_auth_event("me", "error");
            return ApiError::internal("Failed to get user").with_error(e.to_string()).into_response();
        }
    };

    if !reply.status.is_success() {
        metrics::record_auth_event("me", "rejected");
        let mut response = if is_navigation(&headers) {
            Redirect::to(state.session.login_path()).into_response()
        } else {
            match reply.json() {
                Some(body) => (StatusCode::UNAUTHORIZED, Json(body)).into_response(),
                None => ApiError::new(StatusCode::UNAUTHORIZED, "Authentication required")
                    .with_error(status_error(reply.status))
                    .into_response(),
            }
        };
        append_set_cookies(response.headers_mut(), &state.session.clear_session());
        return response;
    }

    let Some(body) = reply.json() else {
        metrics::record_auth_event("me", "error");
        return ApiError::internal("Failed to get user")
            .with_error("Backend returned a non-JSON body")
            .into_response();
    };

    metrics::record_auth_event("me", "success");
    let bootstrap = match cookie_value(&headers, USER_ID_COOKIE) {
        Some(_) => None,
        None => body.pointer("/user/id").and_then(id_string),
    };

    let mut response = Json(body).into_response();
    if let Some(id) = bootstrap {
        append_set_cookies(response.headers_mut(), &[state.session.issue(USER_ID_COOKIE, id)]);
    }
    response
}

/// `POST /api/auth/register`
pub async fn register(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let credentials = match Credentials::parse(&body) {
        Ok(c) => c,
        Err(e) => {
            return ApiError::bad_request("Registration failed").with_error(e).into_response()
        }
    };

    let reply = match call_backend(&state, &headers, Method::POST, "/auth/register", false, Some(&credentials)).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(request_id = %request_id(&headers), error = %e, "Registration error");
            metrics::record_auth_event("register", "error");
            return ApiError::internal("Registration failed").with_error(e.to_string()).into_response();
        }
    };

    let result = reply.json();
    if !reply.status.is_success() {
        metrics::record_auth_event("register", "rejected");
        let error = result
            .as_ref()
            .and_then(error_text)
            .unwrap_or_else(|| status_error(reply.status));
        return ApiError::bad_request("Registration failed").with_error(error).into_response();
    }

    match result {
        Some(result) if has_error(&result) => {
            metrics::record_auth_event("register", "rejected");
            (StatusCode::BAD_REQUEST, Json(result)).into_response()
        }
        _ => {
            metrics::record_auth_event("register", "success");
            relay(&reply, StatusCode::OK)
        }
    }
}

/// `GET /logout`: page-level sign out without a backend round trip.
pub async fn logout_page(State(state): State<AppState>) -> Response {
    let mut response = Redirect::to(state.session.login_path()).into_response();
    append_set_cookies(response.headers_mut(), &state.session.clear_session());
    response
}

/// Call `<backend><upstream_prefix><api_path>` for the request's environment.
async fn call_backend<T: serde::Serialize>(
    state: &AppState,
    headers: &HeaderMap,
    method: Method,
    api_path: &str,
    with_session: bool,
    body: Option<&T>,
) -> Result<BufferedResponse, UpstreamError> {
    let env = state.environments.resolve(headers);
    let url = state.dispatcher.route().api_url(&env.backend_url, api_path);

    let mut upstream_headers = HeaderMap::new();
    propagate_request_id(headers, &mut upstream_headers);
    if with_session {
        let session = SessionCookies::from_headers(headers);
        inject_session_headers(&mut upstream_headers, session.as_ref());
    }

    tracing::debug!(
        request_id = %request_id(headers),
        environment = %env.name,
        method = %method,
        url = %url,
        "Calling backend"
    );

    state
        .dispatcher
        .upstream()
        .send_json(method, &url, upstream_headers, body)
        .await
}

/// Relay a buffered backend body with `status`.
fn relay(reply: &BufferedResponse, status: StatusCode) -> Response {
    match reply.json() {
        Some(value) => (status, Json(value)).into_response(),
        None => raw_response(status, reply.content_type(), reply.body.clone()),
    }
}

fn forward_set_cookies(reply: &BufferedResponse, response: &mut Response) {
    for value in reply.set_cookies() {
        response.headers_mut().append(SET_COOKIE, value.clone());
    }
}

/// Full-page navigations are redirected; API callers get status codes.
fn is_navigation(headers: &HeaderMap) -> bool {
    let navigate = headers
        .get("sec-fetch-mode")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("navigate"));
    let wants_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().starts_with("text/html"));
    navigate || wants_html
}
