//! Origin allow-list.

use axum::http::{header::ORIGIN, HeaderMap};

/// The fixed set of origins allowed to read gateway responses cross-origin.
///
/// Built once at startup and never mutated. Matching is exact on the
/// serialized origin; configured entries are stored without a trailing `/`.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins {
    origins: Vec<String>,
}

impl AllowedOrigins {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: origins
                .into_iter()
                .map(|o| o.into().trim_end_matches('/').to_string())
                .collect(),
        }
    }

    /// Returns true if `origin` is a member of the allow-list.
    pub fn contains(&self, origin: Option<&str>) -> bool {
        match origin {
            Some(origin) => self.origins.iter().any(|o| o == origin),
            None => false,
        }
    }

    /// First configured origin, used only by the legacy preflight fallback.
    pub fn first(&self) -> Option<&str> {
        self.origins.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

/// Read the `Origin` header, if present and valid UTF-8.
pub fn request_origin(headers: &HeaderMap) -> Option<&str> {
    headers.get(ORIGIN).and_then(|v| v.to_str().ok())
}
