//! Numeric verification code generation.
//!
//! Codes are read aloud or typed from an SMS, so they are plain digits from
//! the thread RNG. They are not cryptographic secrets; short TTLs and
//! request-layer rate limits bound guessing.

use rand::Rng;
use sentinel_common::RuntimeMode;

/// Produces fixed-length digit strings
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    length: usize,
    mode: RuntimeMode,
    debug_code: String,
}

impl CodeGenerator {
    pub fn new(length: usize, mode: RuntimeMode, debug_code: impl Into<String>) -> Self {
        Self {
            length,
            mode,
            debug_code: debug_code.into(),
        }
    }

    /// Generate a code. Outside production the configured debug code is
    /// returned so end-to-end tests can submit a known value.
    pub fn generate(&self) -> String {
        if !self.mode.is_production() {
            return self.debug_code.clone();
        }
        random_digits(&mut rand::rng(), self.length)
    }
}

pub fn random_digits<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}
