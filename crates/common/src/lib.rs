//! Shared infrastructure contracts for Steward crates.
//!
//! Sync and push invocations may run concurrently in separate process
//! instances, so the only cross-invocation coordination primitive is the
//! external [`state::SharedStateStore`] defined here. The [`time`] module
//! provides the clock abstraction that keeps TTL behavior deterministic in
//! tests.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod state;
pub mod time;

// Re-export commonly used types and traits for convenience
pub use state::{MemoryStateStore, SharedStateStore, StateError, StateResult};
pub use time::{Clock, MockClock, SystemClock};
