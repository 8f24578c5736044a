//! CAPTCHA answer storage.

use sentinel_common::{RuntimeMode, SentinelError};
use std::time::Duration;

use crate::config::CaptchaConfig;
use crate::store::EphemeralStore;

/// Stores CAPTCHA answers under their challenge id with the CAPTCHA TTL
/// policy. Every comparison consumes the entry, right or wrong.
#[derive(Clone)]
pub struct CaptchaStore {
    store: EphemeralStore,
    ttl: Duration,
}

impl CaptchaStore {
    pub fn new(store: EphemeralStore, config: &CaptchaConfig, mode: RuntimeMode) -> Self {
        Self {
            store,
            ttl: config.ttl(mode),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn set(&self, id: &str, answer: &str) -> Result<(), SentinelError> {
        self.store.set(id, answer, self.ttl).await.map_err(|e| {
            SentinelError::Captcha(format!("failed to store captcha answer: {e}"))
        })
    }

    pub async fn get(&self, id: &str, clear: bool) -> Result<Option<String>, SentinelError> {
        self.store.get(id, clear).await
    }

    /// One-shot comparison. The entry is gone afterwards whatever the outcome.
    pub async fn verify(&self, id: &str, answer: &str) -> bool {
        self.store.verify(id, answer, true).await
    }
}
