//! Backend environment subsystem.
//!
//! # Data Flow
//! ```text
//! startup: EnvironmentsConfig → resolver.rs (fixed table + atomic default)
//! per request: Cookie (optional selection) → resolver.rs → ResolvedEnvironment
//!     → proxy dispatcher / auth bridge
//! admin: POST /api/environment/set → handlers.rs → resolver.set()
//! ```

pub mod handlers;
pub mod resolver;

pub use resolver::{EnvironmentError, EnvironmentResolver, ResolvedEnvironment};
