//! Core types shared across Sentinel components.

use serde::{Deserialize, Serialize};

/// Deployment runtime mode.
///
/// Every debug shortcut (fixed codes, bypass prefixes, CAPTCHA testing key,
/// long TTLs) is gated on `!is_production()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Developer machine
    #[default]
    Local,
    /// Automated test runs
    #[serde(alias = "test")]
    Testing,
    /// Pre-production environment
    #[serde(alias = "staging")]
    Stage,
    /// Live traffic, no debug shortcuts
    #[serde(alias = "prod")]
    Production,
}

impl RuntimeMode {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Testing => "testing",
            Self::Stage => "stage",
            Self::Production => "production",
        }
    }
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verification code written for a phone number or email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationEntry {
    /// Phone number or email address (un-namespaced)
    pub key: String,

    /// The code the user must echo back
    pub code: String,

    /// Expiry timestamp (Unix epoch seconds)
    pub expires_at: i64,
}

/// A CAPTCHA answer keyed by its server-generated challenge id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptchaEntry {
    /// Opaque challenge identifier
    pub id: String,

    /// Expected answer (never sent to the client)
    #[serde(skip_serializing, default)]
    pub answer: String,

    /// Expiry timestamp (Unix epoch seconds)
    pub expires_at: i64,
}

/// CAPTCHA challenge data sent to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptchaChallenge {
    /// Unique challenge ID, echoed back with the answer
    pub captcha_id: String,

    /// Base64 data URI of the rendered image
    pub captcha_image: String,

    /// Seconds until the answer expires
    pub expires_in_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_mode_parsing() {
        let mode: RuntimeMode = serde_json::from_str("\"production\"").unwrap();
        assert!(mode.is_production());

        let mode: RuntimeMode = serde_json::from_str("\"test\"").unwrap();
        assert_eq!(mode, RuntimeMode::Testing);
        assert!(!mode.is_production());

        assert!(serde_json::from_str::<RuntimeMode>("\"debug\"").is_err());
        assert_eq!(RuntimeMode::default(), RuntimeMode::Local);
    }

    #[test]
    fn test_captcha_entry_hides_answer() {
        let entry = CaptchaEntry {
            id: "abc".to_string(),
            answer: "X7K2P9".to_string(),
            expires_at: 0,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("X7K2P9"));
    }
}
