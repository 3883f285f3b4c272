//! Reserved prefix matching and upstream path rewriting.
//!
//! # Design Decisions
//! - Prefix matching is on whole path segments: `/python` matches
//!   `/python` and `/python/...` but not `/pythonic`
//! - The query string is carried over byte for byte
//! - Path matching is case-sensitive

use axum::http::Uri;

use crate::config::ProxyPathConfig;

/// Decides which requests are forwarded and where they land upstream.
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    prefix: String,
    upstream_prefix: String,
    excluded: Vec<String>,
}

impl ProxyRoute {
    pub fn from_config(config: &ProxyPathConfig) -> Self {
        Self {
            prefix: normalize(&config.prefix),
            upstream_prefix: normalize(&config.upstream_prefix),
            excluded: config.excluded_prefixes.iter().map(|p| normalize(p)).collect(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `path` is under the reserved prefix and not excluded.
    pub fn matches(&self, path: &str) -> bool {
        under(path, &self.prefix) && !self.excluded.iter().any(|ex| under(path, ex))
    }

    /// Rewrite an inbound URI into the upstream path and query.
    ///
    /// `/python/foo/bar?x=1` becomes `/api/foo/bar?x=1`. Returns `None` for
    /// URIs the route does not match.
    pub fn rewrite(&self, uri: &Uri) -> Option<String> {
        let path = uri.path();
        if !self.matches(path) {
            return None;
        }

        let remainder = &path[self.prefix.len()..];
        let mut target = format!("{}{}", self.upstream_prefix, remainder);
        if let Some(query) = uri.query() {
            target.push('?');
            target.push_str(query);
        }
        Some(target)
    }

    /// Full backend URL for an upstream API path such as `/auth/login`.
    pub fn api_url(&self, backend_url: &str, api_path: &str) -> String {
        format!("{}{}{}", backend_url.trim_end_matches('/'), self.upstream_prefix, api_path)
    }

    /// Full backend URL for an already rewritten path and query.
    pub fn upstream_url(&self, backend_url: &str, path_and_query: &str) -> String {
        format!("{}{}", backend_url.trim_end_matches('/'), path_and_query)
    }
}

/// Strip trailing slashes; the root prefix `/` becomes empty.
fn normalize(prefix: &str) -> String {
    prefix.trim_end_matches('/').to_string()
}

fn under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
