//! Session bridging subsystem.
//!
//! # Data Flow
//! ```text
//! Browser Cookie header (session=…; user_id=…)
//!     → cookies.rs (SessionCookies: both present or nothing)
//!     → translator.rs (X-Session-ID / X-User-ID on the upstream request)
//!
//! Auth bridge responses:
//!     → cookies.rs (SessionPolicy renders Set-Cookie to issue / clear)
//! ```
//!
//! # States
//! ```text
//! Unauthenticated → Authenticated: login, or `me` bootstrapping user_id
//! Authenticated → Unauthenticated: logout, logout page, failed `me`
//! ```
//!
//! # Design Decisions
//! - Tokens are opaque; no local validation
//! - Session material never appears in URLs

pub mod cookies;
pub mod translator;

pub use cookies::{SessionCookies, SessionPolicy, SESSION_COOKIE, USER_ID_COOKIE};
pub use translator::{inject_session_headers, X_SESSION_ID, X_USER_ID};
