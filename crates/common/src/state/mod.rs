//! Shared-state store contract
//!
//! Session tokens and circuit-breaker counters are the only mutable state
//! shared across concurrent bridge invocations. They live in an external,
//! TTL-capable key/value store reached through [`SharedStateStore`]; nothing
//! in the bridge relies on an in-memory lock or singleton for correctness.

mod memory;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStateStore;

/// Faults from the shared state store itself
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state store unavailable: {0}")]
    Unavailable(String),

    #[error("state store value for {key} is not numeric: {value}")]
    NotNumeric { key: String, value: String },
}

/// Result type for state store operations
pub type StateResult<T> = std::result::Result<T, StateError>;

/// Atomic get/set-with-TTL/increment/expire/delete against the external
/// key/value store.
///
/// Implementations must make `increment` atomic: two concurrent callers must
/// observe distinct counter values.
#[async_trait]
pub trait SharedStateStore: Send + Sync {
    /// Read a key, honoring expiry
    async fn get(&self, key: &str) -> StateResult<Option<String>>;

    /// Write a key with an optional time-to-live
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StateResult<()>;

    /// Atomically increment a numeric key, creating it at 1 when absent.
    /// Returns the post-increment value.
    async fn increment(&self, key: &str) -> StateResult<i64>;

    /// Set a time-to-live on an existing key. Returns false when the key
    /// does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> StateResult<bool>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> StateResult<()>;
}
