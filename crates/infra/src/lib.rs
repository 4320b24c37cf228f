//! # Steward Infrastructure
//!
//! Infrastructure implementations of the core bridge ports.
//!
//! This crate contains:
//! - The HTTP transport wrapper over reqwest
//! - The EXT session manager, circuit breaker and request client
//! - Attachment URL detection and retrieval
//! - Configuration loading (environment first, file fallback)
//!
//! ## Architecture
//! - Implements traits defined in `steward-core`
//! - Depends on `steward-common`, `steward-domain` and `steward-core`
//! - Contains all "impure" code (network I/O, process environment)

pub mod config;
pub mod ext;
pub mod http;

pub use ext::{CircuitBreaker, RequestClient, SessionManager};
pub use http::HttpClient;
