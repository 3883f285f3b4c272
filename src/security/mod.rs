//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (preflight short-circuit)
//!     → [handler / proxy dispatcher]
//!         → headers.rs (strip connection headers, drop cookies upstream)
//!         → headers.rs (strip hop-by-hop + backend CORS on the way back)
//!     → cors.rs (allow headers for allow-listed origins)
//!     → origin.rs (allow-list lookups for both directions)
//! ```
//!
//! # Design Decisions
//! - The allow-list is fixed at startup
//! - Cookies never cross to the backend; see `session`

pub mod cors;
pub mod headers;
pub mod origin;

pub use cors::{cors_middleware, CorsPolicy};
pub use origin::AllowedOrigins;
