//! Image CAPTCHA issuance and verification.
//!
//! A challenge is an opaque id plus a rendered image. The answer lives in the
//! cache under the id and is consumed by the first check.

mod render;
mod store;

pub use store::CaptchaStore;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sentinel_common::{CaptchaChallenge, CaptchaEntry, RuntimeMode, SentinelError};

use crate::config::CaptchaConfig;

/// CAPTCHA service
pub struct CaptchaService {
    store: CaptchaStore,
    length: usize,
    mode: RuntimeMode,
    testing_key: String,
}

impl CaptchaService {
    pub fn new(store: CaptchaStore, config: &CaptchaConfig, mode: RuntimeMode) -> Self {
        Self {
            store,
            length: config.length,
            mode,
            testing_key: config.testing_key.clone(),
        }
    }

    /// Create a challenge and store its answer
    pub async fn generate(&self) -> Result<CaptchaChallenge, SentinelError> {
        let ttl = self.store.ttl();
        let entry = CaptchaEntry {
            id: generate_challenge_id(),
            answer: render::random_answer(&mut rand::rng(), self.length),
            expires_at: crate::store::expires_at(ttl),
        };

        self.store.set(&entry.id, &entry.answer).await?;

        tracing::debug!(
            captcha_id = %entry.id,
            answer = %entry.answer,
            expires_at = entry.expires_at,
            "Generated CAPTCHA challenge"
        );

        Ok(CaptchaChallenge {
            captcha_image: render::render_data_uri(&entry.answer),
            captcha_id: entry.id,
            expires_in_secs: ttl.as_secs(),
        })
    }

    /// Check an answer (case-insensitive). Outside production the configured
    /// testing key passes without a stored challenge.
    pub async fn verify(&self, id: &str, answer: &str) -> bool {
        if !self.mode.is_production() && !self.testing_key.is_empty() && id == self.testing_key {
            tracing::debug!(captcha_id = %id, "CAPTCHA testing key accepted");
            return true;
        }

        let success = self
            .store
            .verify(id, &answer.trim().to_ascii_uppercase())
            .await;

        tracing::debug!(captcha_id = %id, success, "CAPTCHA checked");
        success
    }
}

/// Generate a random challenge ID
fn generate_challenge_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
