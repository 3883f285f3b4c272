//! Session gateway library.
//!
//! A browser-facing gateway that validates CORS origins, turns the
//! `session`/`user_id` cookie pair into backend auth headers, reverse
//! proxies `/python/*` to the selected backend's `/api/*`, and bridges the
//! login, logout, register and current-user flows.

// Core subsystems
pub mod config;
pub mod http;
pub mod proxy;

// Request context
pub mod auth;
pub mod environment;
pub mod session;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
