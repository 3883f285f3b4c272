//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration for the session gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Reserved prefix and upstream path rewriting.
    pub proxy: ProxyPathConfig,

    /// Named backend environments.
    pub environments: EnvironmentsConfig,

    /// Session cookie attributes.
    pub session: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5173").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5173".to_string(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins (scheme + host + port) allowed to read responses.
    pub allowed_origins: Vec<String>,

    /// Value of `Access-Control-Allow-Methods` on preflight responses.
    pub allowed_methods: String,

    /// Value of `Access-Control-Allow-Headers` on preflight responses.
    pub allowed_headers: String,

    /// Value of `Access-Control-Max-Age` on preflight responses.
    pub max_age_secs: u64,

    /// Answer preflights from unknown origins with the first allowed origin.
    /// Off by default; unknown origins get no `Access-Control-Allow-Origin`.
    pub fallback_to_first_origin: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3100".to_string(),
            ],
            allowed_methods: "GET, POST, PUT, DELETE, OPTIONS".to_string(),
            allowed_headers: "Content-Type, Authorization".to_string(),
            max_age_secs: 3600,
            fallback_to_first_origin: false,
        }
    }
}

/// Reserved path prefix configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyPathConfig {
    /// Requests under this prefix are forwarded to the backend.
    pub prefix: String,

    /// Prefix substituted for `prefix` on the backend side.
    pub upstream_prefix: String,

    /// Paths under the reserved prefix that are never forwarded.
    pub excluded_prefixes: Vec<String>,
}

impl Default for ProxyPathConfig {
    fn default() -> Self {
        Self {
            prefix: "/python".to_string(),
            upstream_prefix: "/api".to_string(),
            excluded_prefixes: vec!["/python/environment".to_string()],
        }
    }
}

/// Backend environment table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentsConfig {
    /// Environment selected at startup.
    pub initial: String,

    /// Cookie that lets a browser pick its environment per request.
    /// Disabled when unset.
    pub selection_cookie: Option<String>,

    /// Environment name to backend definition.
    pub targets: BTreeMap<String, EnvironmentConfig>,
}

impl Default for EnvironmentsConfig {
    fn default() -> Self {
        let mut targets = BTreeMap::new();
        targets.insert(
            "local".to_string(),
            EnvironmentConfig {
                backend_url: "http://localhost:3100".to_string(),
                display_name: Some("Local".to_string()),
            },
        );
        targets.insert(
            "production".to_string(),
            EnvironmentConfig {
                backend_url: "http://100.66.179.48:3100".to_string(),
                display_name: Some("Production".to_string()),
            },
        );

        Self {
            initial: "local".to_string(),
            selection_cookie: None,
            targets,
        }
    }
}

/// A single backend environment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvironmentConfig {
    /// Backend base URL (e.g., "http://localhost:3100").
    pub backend_url: String,

    /// Human readable label.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Mark cookies `Secure`. Disable only for plain-HTTP development.
    pub secure_cookies: bool,

    /// Cookie lifetime in seconds.
    pub max_age_secs: u64,

    /// Cookie path attribute.
    pub cookie_path: String,

    /// Where page navigations are sent when the session is rejected.
    pub login_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secure_cookies: true,
            max_age_secs: 60 * 60 * 24 * 7,
            cookie_path: "/".to_string(),
            login_path: "/login".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Backend connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the backend to return response headers, in seconds.
    pub upstream_secs: u64,

    /// Total time for handling an inbound request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            request_secs: 60,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Pretty,
    Full,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes; also bounds buffered backend replies.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
