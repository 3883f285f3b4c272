//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, GATEWAY_* overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to HttpServer, which builds the runtime components
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the only runtime-mutable value is the
//!   selected environment, owned by the environment resolver
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CorsConfig, EnvironmentConfig, EnvironmentsConfig, GatewayConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, ProxyPathConfig, SecurityConfig, SessionConfig, TimeoutConfig,
};
