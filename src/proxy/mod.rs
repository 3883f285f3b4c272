//! Reverse proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Request under the reserved prefix
//!     → route.rs (match + rewrite /python/... → /api/...)
//!     → dispatcher.rs (headers, session translation, forward, relay)
//!     → upstream.rs (pooled hyper client, timeouts)
//!     → Backend
//! ```
//!
//! The auth bridge reuses `route.rs` for backend URLs and `upstream.rs`
//! for its buffered JSON calls.

pub mod dispatcher;
pub mod route;
pub mod upstream;

use thiserror::Error;

use crate::proxy::upstream::UpstreamError;

pub use dispatcher::ProxyDispatcher;
pub use route::ProxyRoute;
pub use upstream::{BufferedResponse, UpstreamClient};

/// Errors while forwarding a request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("path {0} is not under the proxy prefix")]
    NotRoutable(String),

    #[error("invalid upstream URI: {0}")]
    InvalidUri(#[from] axum::http::uri::InvalidUri),

    #[error("failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ProxyError {
    /// Short description safe to show to browsers.
    pub fn public_message(&self) -> &'static str {
        match self {
            ProxyError::Upstream(UpstreamError::Timeout(_)) => "Backend timed out",
            ProxyError::Upstream(_) => "Backend unavailable",
            _ => "Invalid upstream request",
        }
    }
}
