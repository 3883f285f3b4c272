//! Auth bridge payloads and backend reply inspection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// `{email, password}` body accepted by login and register.
#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Parse and check a request body; the error string is user facing.
    pub fn parse(body: &[u8]) -> Result<Self, &'static str> {
        let credentials: Credentials =
            serde_json::from_slice(body).map_err(|_| "Invalid JSON body")?;
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err("Email and password are required");
        }
        Ok(credentials)
    }
}

/// True when a backend JSON reply carries a non-empty `error` field.
pub fn has_error(reply: &Value) -> bool {
    match reply.get("error") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// The backend `error` field as text, if it is a string.
pub fn error_text(reply: &Value) -> Option<String> {
    reply.get("error").and_then(Value::as_str).map(str::to_owned)
}

/// A user id from a JSON number or non-empty string.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
