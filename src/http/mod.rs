//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID generation and lookup)
//!     → auth / environment handlers, or the proxy dispatcher
//!     → response.rs (error envelope, buffered relays)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::{ApiError, ErrorEnvelope};
pub use server::{AppState, HttpServer};
