//! # Steward Domain
//!
//! Business domain types and models for the Steward compliance portal.
//!
//! This crate contains:
//! - Domain data types (Property, Buyer, Submission, etc.)
//! - The bridge error taxonomy and EXT error classifier
//! - Configuration structures for the EXT bridge
//! - Domain constants (TTLs, thresholds, page sizes)
//!
//! ## Architecture
//! - No dependencies on other Steward crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
