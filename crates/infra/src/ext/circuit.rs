//! Store-backed circuit breaker for EXT calls
//!
//! There is no separate open/closed flag: the failure counter's presence at
//! or above the threshold is the open state, and its TTL is the cool-down.
//! After the TTL lapses the key disappears and the breaker is implicitly
//! closed again; no half-open probe state exists.

use std::sync::Arc;
use std::time::Duration;

use steward_common::state::SharedStateStore;
use steward_domain::constants::{CIRCUIT_COOLDOWN_SECS, CIRCUIT_FAILURE_THRESHOLD, CIRCUIT_KEY};
use tracing::{debug, warn};

pub struct CircuitBreaker {
    store: Arc<dyn SharedStateStore>,
}

impl CircuitBreaker {
    pub fn new(store: Arc<dyn SharedStateStore>) -> Self {
        Self { store }
    }

    /// True iff the shared failure counter exists and is at the threshold.
    ///
    /// When the store itself is unreachable the breaker fails open and
    /// reports closed: unavailable infrastructure must not halt traffic.
    pub async fn is_open(&self) -> bool {
        match self.store.get(CIRCUIT_KEY).await {
            Ok(Some(raw)) => {
                raw.parse::<i64>().map(|count| count >= CIRCUIT_FAILURE_THRESHOLD).unwrap_or(false)
            }
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "state store unreachable, treating breaker as closed");
                false
            }
        }
    }

    /// Increment the failure counter, starting the cool-down window only on
    /// the absent-to-one transition.
    pub async fn record_failure(&self) {
        match self.store.increment(CIRCUIT_KEY).await {
            Ok(1) => {
                if let Err(err) =
                    self.store.expire(CIRCUIT_KEY, Duration::from_secs(CIRCUIT_COOLDOWN_SECS)).await
                {
                    warn!(error = %err, "failed to set circuit cool-down");
                }
                debug!(count = 1, "EXT failure recorded");
            }
            Ok(count) => debug!(count, "EXT failure recorded"),
            Err(err) => warn!(error = %err, "failed to record EXT failure"),
        }
    }

    /// Any success closes the breaker immediately.
    pub async fn record_success(&self) {
        if let Err(err) = self.store.delete(CIRCUIT_KEY).await {
            warn!(error = %err, "failed to reset circuit counter");
        }
    }
}
