//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (initial environment exists)
//! - Validate value shapes (origins, backend URLs, path prefixes)
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.cors.allowed_origins.is_empty() && config.cors.fallback_to_first_origin {
        errors.push(ValidationError::new(
            "cors.fallback_to_first_origin",
            "requires at least one allowed origin",
        ));
    }
    for (i, origin) in config.cors.allowed_origins.iter().enumerate() {
        if !is_origin(origin) {
            errors.push(ValidationError::new(
                format!("cors.allowed_origins[{}]", i),
                format!("'{}' is not a scheme://host[:port] origin", origin),
            ));
        }
    }

    check_prefix(&mut errors, "proxy.prefix", &config.proxy.prefix);
    check_prefix(&mut errors, "proxy.upstream_prefix", &config.proxy.upstream_prefix);
    for (i, excluded) in config.proxy.excluded_prefixes.iter().enumerate() {
        check_prefix(&mut errors, &format!("proxy.excluded_prefixes[{}]", i), excluded);
    }

    if config.environments.targets.is_empty() {
        errors.push(ValidationError::new(
            "environments.targets",
            "at least one environment is required",
        ));
    } else if !config.environments.targets.contains_key(&config.environments.initial) {
        errors.push(ValidationError::new(
            "environments.initial",
            format!("unknown environment '{}'", config.environments.initial),
        ));
    }
    for (name, target) in &config.environments.targets {
        match Url::parse(&target.backend_url) {
            Ok(url) if url.scheme() == "http" && url.host_str().is_some() => {}
            Ok(_) => errors.push(ValidationError::new(
                format!("environments.targets.{}.backend_url", name),
                "only http:// backends are supported",
            )),
            Err(e) => errors.push(ValidationError::new(
                format!("environments.targets.{}.backend_url", name),
                e.to_string(),
            )),
        }
    }
    if let Some(cookie) = &config.environments.selection_cookie {
        if cookie.is_empty() || cookie.contains(['=', ';', ' ']) {
            errors.push(ValidationError::new(
                "environments.selection_cookie",
                "must be a plain cookie name",
            ));
        }
    }

    if config.session.max_age_secs == 0 {
        errors.push(ValidationError::new("session.max_age_secs", "must be > 0"));
    }
    if !config.session.cookie_path.starts_with('/') {
        errors.push(ValidationError::new("session.cookie_path", "must start with '/'"));
    }
    if !config.session.login_path.starts_with('/') {
        errors.push(ValidationError::new("session.login_path", "must start with '/'"));
    }

    for (field, value) in [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be > 0"));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_origin(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some()
                && url.path() == "/"
                && url.query().is_none()
                && url.fragment().is_none()
        }
        Err(_) => false,
    }
}

fn check_prefix(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::new(field, "must start with '/'"));
    } else if value.contains(['?', '#']) {
        errors.push(ValidationError::new(field, "must be a plain path"));
    }
}
