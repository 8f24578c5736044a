//! Outbound delivery of verification codes.
//!
//! Real gateways live outside this service; Sentinel only needs the
//! capability `send(recipient, payload) -> bool`. The bundled log drivers
//! write the payload to the tracing output, which is what local and test
//! deployments use.

mod log_driver;

pub use log_driver::{LogMailSender, LogSmsSender};

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

/// Templated SMS: the gateway renders `template` with `data`.
#[derive(Debug, Clone, Serialize)]
pub struct SmsMessage {
    pub template: String,
    pub data: HashMap<String, String>,
}

/// A rendered email
#[derive(Debug, Clone, Serialize)]
pub struct Email {
    pub from: EmailAddress,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailAddress {
    pub address: String,
    pub name: String,
}

/// SMS gateway capability
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Returns whether the gateway accepted the message
    async fn send(&self, phone: &str, message: &SmsMessage) -> bool;
}

/// Email gateway capability. `config` carries driver settings
/// (host, port, credentials) and is opaque to Sentinel.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Returns whether the gateway accepted the message
    async fn send(&self, email: &Email, config: &HashMap<String, String>) -> bool;
}
