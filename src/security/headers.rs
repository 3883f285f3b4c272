//! Header manipulation between the browser and the backend.
//!
//! # Responsibilities
//! - Strip connection-specific headers before forwarding upstream
//! - Strip hop-by-hop and backend CORS headers from upstream responses
//! - Leave the request ID on upstream requests
//!
//! # Design Decisions
//! - `cookie` never leaves the gateway; auth context travels only as the
//!   translated session headers
//! - `accept-encoding` is dropped upstream so the relayed body never needs a
//!   `content-encoding` header
//! - Backend `access-control-*` headers are removed so the gateway's own CORS
//!   layer is the single source of those values

use axum::http::header::{
    HeaderMap, HeaderName, ACCEPT_ENCODING, CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH, COOKIE,
    HOST, TRANSFER_ENCODING,
};

const KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");

const REQUEST_STRIPPED: [HeaderName; 7] = [
    HOST,
    CONNECTION,
    KEEP_ALIVE,
    TRANSFER_ENCODING,
    CONTENT_LENGTH,
    COOKIE,
    ACCEPT_ENCODING,
];

const RESPONSE_STRIPPED: [HeaderName; 4] = [CONTENT_ENCODING, TRANSFER_ENCODING, CONNECTION, KEEP_ALIVE];

/// Remove connection-specific headers from an inbound request before it is
/// forwarded to the backend.
pub fn filter_request_headers(headers: &mut HeaderMap) {
    for name in &REQUEST_STRIPPED {
        headers.remove(name);
    }
}

/// Remove hop-by-hop and CORS headers from a backend response.
pub fn filter_response_headers(headers: &mut HeaderMap) {
    for name in &RESPONSE_STRIPPED {
        headers.remove(name);
    }

    let cors: Vec<HeaderName> = headers
        .keys()
        .filter(|name| name.as_str().starts_with("access-control-"))
        .cloned()
        .collect();
    for name in cors {
        headers.remove(&name);
    }
}
