//! Auth bridge subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/auth/login     → backend /api/auth/login    → set session + user_id
//! DELETE /api/auth/logout  → backend /api/auth/logout   → clear both (always)
//! GET /api/auth/me         → backend /api/auth/me       → clear on failure,
//!                                                         bootstrap user_id
//! POST /api/auth/register  → backend /api/auth/register → relay
//! GET /logout              → clear both, redirect to login
//! ```
//!
//! # Design Decisions
//! - Backend URLs and the HTTP client are shared with the proxy dispatcher
//! - Session context reaches the backend only as X-Session-ID / X-User-ID
//! - Unauthenticated `me`: 401 for API callers, 303 to login for navigations

pub mod handlers;
pub mod types;

pub use handlers::{login, logout, logout_page, me, register};
pub use types::Credentials;
