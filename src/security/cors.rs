//! CORS middleware.
//!
//! # Responsibilities
//! - Answer every `OPTIONS` request as a preflight, without routing it
//! - Add `Access-Control-Allow-Origin`/`-Credentials` to every other response
//!   when the request origin is allow-listed
//!
//! # Design Decisions
//! - Headers are inserted, not appended: the gateway's values replace
//!   anything a handler or the backend put there
//! - Unknown origins never receive an Allow-Origin value unless the legacy
//!   first-origin fallback is switched on for preflights

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
        },
        HeaderMap, HeaderValue, Method, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::config::CorsConfig;
use crate::security::origin::{request_origin, AllowedOrigins};

/// Precomputed CORS policy shared by all requests.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origins: AllowedOrigins,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    max_age: HeaderValue,
    fallback_to_first_origin: bool,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Self {
        Self {
            origins: AllowedOrigins::new(config.allowed_origins.iter().cloned()),
            allow_methods: HeaderValue::from_str(&config.allowed_methods)
                .unwrap_or_else(|_| HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS")),
            allow_headers: HeaderValue::from_str(&config.allowed_headers)
                .unwrap_or_else(|_| HeaderValue::from_static("Content-Type, Authorization")),
            max_age: HeaderValue::from(config.max_age_secs),
            fallback_to_first_origin: config.fallback_to_first_origin,
        }
    }

    pub fn origins(&self) -> &AllowedOrigins {
        &self.origins
    }

    /// Build the response to a preflight request.
    pub fn preflight(&self, origin: Option<&str>) -> Response {
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();

        let allow_origin = if self.origins.contains(origin) {
            origin
        } else if self.fallback_to_first_origin {
            self.origins.first()
        } else {
            None
        };
        if let Some(value) = allow_origin.and_then(|o| HeaderValue::from_str(o).ok()) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }

        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        headers.insert(ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
        response
    }

    /// Layer the allow headers onto a non-preflight response.
    pub fn apply(&self, origin: Option<&str>, headers: &mut HeaderMap) {
        if !self.origins.contains(origin) {
            return;
        }
        if let Some(value) = origin.and_then(|o| HeaderValue::from_str(o).ok()) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
            headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }
    }
}

/// Middleware function applying [`CorsPolicy`] to every request.
pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request_origin(request.headers()).map(str::to_owned);

    if request.method() == Method::OPTIONS {
        tracing::debug!(origin = ?origin, path = %request.uri().path(), "Preflight request");
        return policy.preflight(origin.as_deref());
    }

    let mut response = next.run(request).await;
    policy.apply(origin.as_deref(), response.headers_mut());
    response
}
