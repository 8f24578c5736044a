//! In-process cache backend.
//!
//! Expiry is checked on access; expired entries are swept on every write so
//! the map does not grow without bound. Not shared across processes, so only
//! suitable for single-node development and tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use sentinel_common::SentinelError;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::CacheBackend;

struct Slot {
    value: String,
    deadline: Instant,
}

impl Slot {
    fn is_live(&self, now: Instant) -> bool {
        now < self.deadline
    }
}

/// TTL map guarded by a single mutex
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Slot>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), SentinelError> {
        let now = Instant::now();
        let deadline = now.checked_add(ttl).ok_or_else(|| {
            SentinelError::InvalidInput(format!("TTL for key {key} is out of range"))
        })?;

        let mut entries = self.entries.lock();
        entries.retain(|_, slot| slot.is_live(now));
        entries.insert(
            key.to_string(),
            Slot {
                value: value.to_string(),
                deadline,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SentinelError> {
        let now = Instant::now();
        let entries = self.entries.lock();
        Ok(entries
            .get(key)
            .filter(|slot| slot.is_live(now))
            .map(|slot| slot.value.clone()))
    }

    async fn take(&self, key: &str) -> Result<Option<String>, SentinelError> {
        let now = Instant::now();
        let slot = self.entries.lock().remove(key);
        Ok(slot.filter(|s| s.is_live(now)).map(|s| s.value))
    }

    async fn del(&self, key: &str) -> Result<(), SentinelError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<(), SentinelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_expired_entries_are_swept_on_write() {
        let backend = MemoryBackend::new();
        backend.set_ex("a", "1", Duration::from_millis(20)).await.unwrap();
        backend.set_ex("b", "2", Duration::from_secs(60)).await.unwrap();
        assert_eq!(backend.entries.lock().len(), 2);

        tokio::time::sleep(Duration::from_millis(40)).await;
        backend.set_ex("c", "3", Duration::from_secs(60)).await.unwrap();

        assert_eq!(backend.entries.lock().len(), 2);
        assert!(backend.entries.lock().get("a").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_take_yields_value_once() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_ex("captcha", "ANSWER", Duration::from_secs(60)).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let backend = backend.clone();
                tokio::spawn(async move { backend.take("captcha").await.unwrap() })
            })
            .collect();

        let mut hits = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                hits += 1;
            }
        }
        assert_eq!(hits, 1);
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_is_rejected() {
        let backend = MemoryBackend::new();
        let result = backend.set_ex("k", "v", Duration::from_secs(u64::MAX)).await;

        assert!(matches!(result, Err(SentinelError::InvalidInput(_))));
        assert!(backend.get("k").await.unwrap().is_none());
    }
}
