//! Common error types for Sentinel components.

use thiserror::Error;

/// Common errors across Sentinel components
#[derive(Debug, Error)]
pub enum SentinelError {
    /// Configuration error (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cache connection/operation error
    #[error("Store error: {0}")]
    Store(String),

    /// SMS/email delivery failure
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// CAPTCHA generation/verification error
    #[error("CAPTCHA error: {0}")]
    Captcha(String),

    /// Invalid input/request
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SentinelError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::Store(_) => 503,
            Self::Delivery(_) => 502,
            Self::Captcha(_) => 500,
            Self::InvalidInput(_) => 422,
        }
    }
}
