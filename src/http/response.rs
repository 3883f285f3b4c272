//! Response helpers.
//!
//! # Responsibilities
//! - Render locally generated failures as one JSON envelope
//! - Relay buffered backend payloads (JSON or raw) with a chosen status
//!
//! # Design Decisions
//! - Envelope shape is `{ "message": string, "error"?: string }` everywhere
//! - Proxied bodies are never routed through here; they stream untouched

use axum::{
    body::Bytes,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// JSON body of every error produced by the gateway itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An HTTP error with a JSON envelope body.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorEnvelope,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorEnvelope {
                message: message.into(),
                error: None,
            },
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.body.error = Some(error.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Message used when a backend body cannot be relayed as JSON.
pub fn status_error(status: StatusCode) -> String {
    format!("Server responded with status: {}", status)
}

/// Relay raw backend bytes with the given status and content type.
pub fn raw_response(status: StatusCode, content_type: Option<&HeaderValue>, body: Bytes) -> Response {
    let mut response = (status, body).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type.clone());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_envelope_shape() {
        let response = ApiError::bad_request("Login failed")
            .with_error("Email and password are required")
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "Login failed",
                "error": "Email and password are required"
            })
        );
    }

    #[tokio::test]
    async fn test_envelope_without_error_field() {
        let response = ApiError::internal("Error proxying request").into_response();

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], br#"{"message":"Error proxying request"}"#);
    }

    #[test]
    fn test_status_error_text() {
        assert_eq!(
            status_error(StatusCode::BAD_GATEWAY),
            "Server responded with status: 502 Bad Gateway"
        );
    }
}
