//! Backend environment resolution.

use arc_swap::ArcSwap;
use axum::http::HeaderMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{EnvironmentConfig, EnvironmentsConfig};
use crate::session::cookies::cookie_value;

/// Errors raised when selecting an environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("Unknown environment: {0}")]
    Unknown(String),
}

/// An environment chosen for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEnvironment {
    pub name: String,
    pub backend_url: String,
}

impl ResolvedEnvironment {
    fn new(name: &str, config: &EnvironmentConfig) -> Self {
        Self {
            name: name.to_string(),
            backend_url: config.backend_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Resolves which backend a request is sent to.
///
/// The environment table is fixed at startup. The process-wide default is a
/// whole `ResolvedEnvironment` swapped atomically, so a reader always sees a
/// matching name and URL without taking a lock.
#[derive(Debug)]
pub struct EnvironmentResolver {
    targets: BTreeMap<String, EnvironmentConfig>,
    current: ArcSwap<ResolvedEnvironment>,
    selection_cookie: Option<String>,
}

impl EnvironmentResolver {
    pub fn from_config(config: &EnvironmentsConfig) -> Result<Self, EnvironmentError> {
        let initial = config
            .targets
            .get(&config.initial)
            .map(|target| ResolvedEnvironment::new(&config.initial, target))
            .ok_or_else(|| EnvironmentError::Unknown(config.initial.clone()))?;

        Ok(Self {
            targets: config.targets.clone(),
            current: ArcSwap::from_pointee(initial),
            selection_cookie: config.selection_cookie.clone(),
        })
    }

    /// The process-wide default environment.
    pub fn get(&self) -> Arc<ResolvedEnvironment> {
        self.current.load_full()
    }

    /// Change the process-wide default environment.
    pub fn set(&self, name: &str) -> Result<Arc<ResolvedEnvironment>, EnvironmentError> {
        let target = self
            .targets
            .get(name)
            .ok_or_else(|| EnvironmentError::Unknown(name.to_string()))?;

        let resolved = Arc::new(ResolvedEnvironment::new(name, target));
        let previous = self.current.swap(resolved.clone());

        tracing::info!(
            from = %previous.name,
            to = %resolved.name,
            backend_url = %resolved.backend_url,
            "Environment switched"
        );
        Ok(resolved)
    }

    /// Resolve the environment for a single request.
    ///
    /// A selection cookie naming a known environment wins for that request;
    /// otherwise the process-wide default applies.
    pub fn resolve(&self, headers: &HeaderMap) -> Arc<ResolvedEnvironment> {
        let selected = self
            .selection_cookie
            .as_deref()
            .and_then(|cookie| cookie_value(headers, cookie))
            .and_then(|name| {
                self.targets
                    .get(&name)
                    .map(|target| ResolvedEnvironment::new(&name, target))
            });

        match selected {
            Some(env) => Arc::new(env),
            None => self.get(),
        }
    }

    /// Names of all configured environments, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }

    pub fn display_name(&self, name: &str) -> Option<&str> {
        self.targets.get(name).and_then(|t| t.display_name.as_deref())
    }
}
