//! Shared HTTP client for every backend call.
//!
//! # Responsibilities
//! - Own the pooled hyper client (connect timeout, keep-alive pool)
//! - Bound the wait for response headers with the upstream timeout
//! - Offer a buffered JSON call for the auth bridge
//!
//! # Design Decisions
//! - Streaming callers get `Response<Incoming>` untouched
//! - Buffered calls read at most `max_body_size` bytes
//! - Dropping the returned future aborts the backend request

use axum::{
    body::{Body, Bytes},
    http::{
        header::{ACCEPT, CONTENT_TYPE, SET_COOKIE},
        HeaderMap, HeaderValue, Method, Request, Response, StatusCode, Uri,
    },
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::{SecurityConfig, TimeoutConfig};

/// Errors from talking to the backend.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("backend request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    #[error("backend did not respond within {0:?}")]
    Timeout(Duration),

    #[error("failed to read backend response: {0}")]
    Body(#[from] axum::Error),

    #[error("invalid backend URL: {0}")]
    InvalidUri(#[from] axum::http::uri::InvalidUri),

    #[error("failed to build backend request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A fully read backend response.
#[derive(Debug, Clone)]
pub struct BufferedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BufferedResponse {
    /// Body parsed as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Backend `Set-Cookie` header values, in order.
    pub fn set_cookies(&self) -> impl Iterator<Item = &HeaderValue> {
        self.headers.get_all(SET_COOKIE).iter()
    }

    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.headers.get(CONTENT_TYPE)
    }
}

/// Pooled client used by the dispatcher and the auth bridge.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    max_body_size: usize,
}

impl UpstreamClient {
    pub fn new(timeouts: &TimeoutConfig, security: &SecurityConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(90))
            .build(connector);

        Self {
            client,
            timeout: Duration::from_secs(timeouts.upstream_secs),
            max_body_size: security.max_body_size,
        }
    }

    /// Send a request and return the streaming response once headers arrive.
    pub async fn send(&self, request: Request<Body>) -> Result<Response<Incoming>, UpstreamError> {
        match tokio::time::timeout(self.timeout, self.client.request(request)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(UpstreamError::Timeout(self.timeout)),
        }
    }

    /// Send a request with an optional JSON body and buffer the response.
    ///
    /// `extra` is copied onto the request (session headers, request ID).
    pub async fn send_json<T: Serialize>(
        &self,
        method: Method,
        url: &str,
        extra: HeaderMap,
        body: Option<&T>,
    ) -> Result<BufferedResponse, UpstreamError> {
        let uri: Uri = url.parse()?;
        let (body, has_body) = match body {
            Some(value) => (Body::from(serde_json::to_vec(value)?), true),
            None => (Body::empty(), false),
        };

        let mut request = Request::builder().method(method).uri(uri).body(body)?;
        let headers = request.headers_mut();
        headers.extend(extra);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        } else {
            headers.remove(CONTENT_TYPE);
        }

        let response = self.send(request).await?;
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), self.max_body_size).await?;

        Ok(BufferedResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_json() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("flask=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("flask_sig=2"));
        let response = BufferedResponse {
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(br#"{"user":{"id":7}}"#),
        };

        assert_eq!(response.json().unwrap()["user"]["id"], 7);
        assert_eq!(response.set_cookies().count(), 2);
    }

    #[test]
    fn test_buffered_non_json() {
        let response = BufferedResponse {
            status: StatusCode::BAD_GATEWAY,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"<html>bad gateway</html>"),
        };

        assert!(response.json().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = closed.local_addr().unwrap();
        drop(closed);

        let client = UpstreamClient::new(&TimeoutConfig::default(), &SecurityConfig::default());
        let url = format!("http://{}/api/auth/me", addr);
        let err = client
            .send_json::<Value>(Method::GET, &url, HeaderMap::new(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Request(_) | UpstreamError::Timeout(_)));
    }
}
