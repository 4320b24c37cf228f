//! EXT record-management platform integration
//!
//! Layering inside this module mirrors the call path: the circuit breaker
//! gates every request, the request client executes it with a token from
//! the session manager, and both coordination states live in the shared
//! store rather than process memory.

pub mod attachments;
mod circuit;
mod client;
mod protocol;
mod session;

pub use circuit::CircuitBreaker;
pub use client::{LayoutFields, ListOptions, PortalOptions, RequestClient};
pub use session::SessionManager;
