//! Ephemeral key/value store with per-key TTL.
//!
//! [`EphemeralStore`] is a namespaced wrapper over a [`CacheBackend`]. The
//! backend is Redis in deployments and an in-process map for local runs
//! and tests.
//!
//! ```text
//! VerificationService ──┐
//!                       ├─→ EphemeralStore(prefix) ─→ CacheBackend ─→ Redis
//! CaptchaStore ─────────┘
//! ```

mod memory;
mod redis_backend;

pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;

use async_trait::async_trait;
use sentinel_common::SentinelError;
use std::sync::Arc;
use std::time::Duration;

/// Raw cache operations: `SET key value EX ttl`, `GET`, `DEL`.
///
/// Implementations must be safe for concurrent use; callers add no locking.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Write a value, replacing any previous one and resetting its TTL
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), SentinelError>;

    /// Read a value; `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, SentinelError>;

    /// Read and delete a value in one atomic step
    async fn take(&self, key: &str) -> Result<Option<String>, SentinelError>;

    /// Remove a key. Removing a missing key succeeds.
    async fn del(&self, key: &str) -> Result<(), SentinelError>;

    /// Connectivity check
    async fn ping(&self) -> Result<(), SentinelError>;
}

/// Unix timestamp `ttl` from now, saturating on absurd TTLs
pub fn expires_at(ttl: Duration) -> i64 {
    let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    chrono::Utc::now().timestamp().saturating_add(secs)
}

/// Namespaced TTL store shared by verification codes and CAPTCHA answers.
#[derive(Clone)]
pub struct EphemeralStore {
    backend: Arc<dyn CacheBackend>,
    prefix: String,
}

impl EphemeralStore {
    pub fn new(backend: Arc<dyn CacheBackend>, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Store `value` under `key` for `ttl`, overwriting any live value.
    pub async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), SentinelError> {
        if ttl.is_zero() {
            return Err(SentinelError::InvalidInput(format!(
                "TTL for key {key} must be positive"
            )));
        }

        self.backend.set_ex(&self.namespaced(key), value, ttl).await
    }

    /// Fetch the live value for `key`. With `clear`, the key is deleted as
    /// part of the same read.
    pub async fn get(&self, key: &str, clear: bool) -> Result<Option<String>, SentinelError> {
        let key = self.namespaced(key);
        if clear {
            self.backend.take(&key).await
        } else {
            self.backend.get(&key).await
        }
    }

    pub async fn delete(&self, key: &str) -> Result<(), SentinelError> {
        self.backend.del(&self.namespaced(key)).await
    }

    /// Compare `answer` with the stored value.
    ///
    /// Only the outcome leaves this function. A backend failure counts as a
    /// mismatch.
    pub async fn verify(&self, key: &str, answer: &str, clear: bool) -> bool {
        match self.get(key, clear).await {
            Ok(Some(stored)) => stored == answer,
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(
                    prefix = %self.prefix,
                    key = %key,
                    error = %e,
                    "Store read failed during verification"
                );
                false
            }
        }
    }

    pub async fn ping(&self) -> Result<(), SentinelError> {
        self.backend.ping().await
    }
}
