//! In-memory implementation of the shared-state store
//!
//! Used by tests and single-node deployments. TTLs are evaluated against an
//! injected [`Clock`] so expiry can be tested without sleeping.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{SharedStateStore, StateError, StateResult};
use crate::time::{Clock, SystemClock};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

/// HashMap-backed state store with clock-driven TTL expiry
pub struct MemoryStateStore<C: Clock = SystemClock> {
    entries: Mutex<HashMap<String, Entry>>,
    clock: C,
}

impl MemoryStateStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStateStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryStateStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { entries: Mutex::new(HashMap::new()), clock }
    }

    fn live_value(&self, entries: &mut HashMap<String, Entry>, key: &str) -> Option<String> {
        let now = self.clock.now();
        match entries.get(key) {
            Some(entry) if entry.expires_at.map_or(true, |at| at > now) => {
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl<C: Clock> SharedStateStore for MemoryStateStore<C> {
    async fn get(&self, key: &str) -> StateResult<Option<String>> {
        let mut entries = self.entries.lock();
        Ok(self.live_value(&mut entries, key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StateResult<()> {
        let expires_at = ttl.map(|ttl| self.clock.now() + ttl);
        self.entries
            .lock()
            .insert(key.to_string(), Entry { value: value.to_string(), expires_at });
        Ok(())
    }

    async fn increment(&self, key: &str) -> StateResult<i64> {
        let mut entries = self.entries.lock();
        let current = match self.live_value(&mut entries, key) {
            Some(value) => value
                .parse::<i64>()
                .map_err(|_| StateError::NotNumeric { key: key.to_string(), value })?,
            None => 0,
        };
        let next = current + 1;

        // Preserve any TTL already on the key; a fresh key has none until
        // the caller sets one.
        let expires_at = entries.get(key).and_then(|entry| entry.expires_at);
        entries.insert(key.to_string(), Entry { value: next.to_string(), expires_at });
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StateResult<bool> {
        let mut entries = self.entries.lock();
        if self.live_value(&mut entries, key).is_none() {
            return Ok(false);
        }
        let deadline = self.clock.now() + ttl;
        if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = Some(deadline);
        }
        Ok(true)
    }

    async fn delete(&self, key: &str) -> StateResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::time::MockClock;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let store = MemoryStateStore::new();
        store.set("k", "v", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryStateStore::new();
        assert_eq!(store.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let clock = MockClock::new();
        let store = MemoryStateStore::with_clock(clock.clone());

        store.set("k", "v", Some(Duration::from_secs(60))).await.unwrap();
        assert!(store.get("k").await.unwrap().is_some());

        clock.advance_secs(61);
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_increment_from_absent() {
        let store = MemoryStateStore::new();
        assert_eq!(store.increment("counter").await.unwrap(), 1);
        assert_eq!(store.increment("counter").await.unwrap(), 2);
        assert_eq!(store.increment("counter").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_increment_preserves_ttl() {
        let clock = MockClock::new();
        let store = MemoryStateStore::with_clock(clock.clone());

        store.increment("counter").await.unwrap();
        store.expire("counter", Duration::from_secs(300)).await.unwrap();
        store.increment("counter").await.unwrap();

        clock.advance_secs(301);
        assert_eq!(store.get("counter").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_increment_non_numeric_value() {
        let store = MemoryStateStore::new();
        store.set("k", "not-a-number", None).await.unwrap();
        let err = store.increment("k").await.unwrap_err();
        assert!(matches!(err, StateError::NotNumeric { .. }));
    }

    #[tokio::test]
    async fn test_expire_on_missing_key() {
        let store = MemoryStateStore::new();
        assert!(!store.expire("absent", Duration::from_secs(5)).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStateStore::new();
        store.set("k", "v", None).await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_distinct() {
        let store = Arc::new(MemoryStateStore::new());
        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.increment("shared").await.unwrap() }));
        }
        let mut seen = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=10).collect::<Vec<i64>>());
    }
}
