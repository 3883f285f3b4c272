//! Reverse proxy dispatch for the reserved prefix.
//!
//! # Steps
//! ```text
//! 1. environment resolved by the caller (per request)
//! 2. /python/rest?q → /api/rest?q
//! 3. strip connection headers + cookies, inject X-Session-ID / X-User-ID
//! 4. send (body streamed; GET/HEAD send none)
//! 5. strip hop-by-hop + access-control-* from the reply, stream it back
//! ```
//!
//! Every accepted request yields exactly one response: the relayed backend
//! response or a local 500 envelope.

use axum::{
    body::Body,
    http::{Method, Request, Uri},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;

use crate::environment::ResolvedEnvironment;
use crate::http::request::request_id;
use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::proxy::route::ProxyRoute;
use crate::proxy::upstream::UpstreamClient;
use crate::proxy::ProxyError;
use crate::security::headers::{filter_request_headers, filter_response_headers};
use crate::session::{inject_session_headers, SessionCookies};

/// Forwards reserved-prefix requests to the resolved backend.
#[derive(Clone)]
pub struct ProxyDispatcher {
    route: Arc<ProxyRoute>,
    upstream: UpstreamClient,
}

impl ProxyDispatcher {
    pub fn new(route: ProxyRoute, upstream: UpstreamClient) -> Self {
        Self {
            route: Arc::new(route),
            upstream,
        }
    }

    pub fn route(&self) -> &ProxyRoute {
        &self.route
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// Returns true if the dispatcher is responsible for `path`.
    pub fn handles(&self, path: &str) -> bool {
        self.route.matches(path)
    }

    /// Forward a request and relay the backend response.
    ///
    /// Never fails: upstream errors become a 500 envelope.
    pub async fn forward(&self, target: &ResolvedEnvironment, request: Request<Body>) -> Response {
        let start_time = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let request_id = request_id(request.headers()).to_string();

        match self.try_forward(target, request).await {
            Ok(response) => {
                tracing::debug!(
                    request_id = %request_id,
                    environment = %target.name,
                    method = %method,
                    path = %path,
                    status = %response.status(),
                    "Relayed backend response"
                );
                metrics::record_request(method.as_str(), response.status().as_u16(), &target.name, start_time);
                response
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    environment = %target.name,
                    method = %method,
                    path = %path,
                    error = %e,
                    "Error proxying request"
                );
                metrics::record_upstream_failure(&target.name);
                metrics::record_request(method.as_str(), 500, &target.name, start_time);
                ApiError::internal("Error proxying request")
                    .with_error(e.public_message())
                    .into_response()
            }
        }
    }

    async fn try_forward(
        &self,
        target: &ResolvedEnvironment,
        request: Request<Body>,
    ) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();

        let path_and_query = self
            .route
            .rewrite(&parts.uri)
            .ok_or_else(|| ProxyError::NotRoutable(parts.uri.path().to_string()))?;
        let uri: Uri = self
            .route
            .upstream_url(&target.backend_url, &path_and_query)
            .parse()?;

        let session = SessionCookies::from_headers(&parts.headers);
        let mut headers = parts.headers;
        filter_request_headers(&mut headers);
        let authenticated = inject_session_headers(&mut headers, session.as_ref());

        let body = if parts.method == Method::GET || parts.method == Method::HEAD {
            Body::empty()
        } else {
            body
        };

        tracing::debug!(
            method = %parts.method,
            upstream = %uri,
            authenticated,
            "Forwarding request"
        );

        let mut outbound = Request::builder().method(parts.method).uri(uri).body(body)?;
        *outbound.headers_mut() = headers;

        let response = self.upstream.send(outbound).await?;
        let (mut parts, body) = response.into_parts();
        filter_response_headers(&mut parts.headers);

        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
