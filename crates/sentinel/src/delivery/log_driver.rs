//! Drivers that log instead of sending.

use async_trait::async_trait;
use std::collections::HashMap;

use super::{Email, MailSender, SmsMessage, SmsSender};

/// Writes SMS payloads to the log and reports success
#[derive(Debug, Default)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send(&self, phone: &str, message: &SmsMessage) -> bool {
        tracing::info!(
            phone = %phone,
            template = %message.template,
            data = ?message.data,
            "SMS delivered to log driver"
        );
        true
    }
}

/// Writes emails to the log and reports success
#[derive(Debug, Default)]
pub struct LogMailSender;

#[async_trait]
impl MailSender for LogMailSender {
    async fn send(&self, email: &Email, config: &HashMap<String, String>) -> bool {
        tracing::info!(
            to = ?email.to,
            from = %email.from.address,
            subject = %email.subject,
            driver_keys = ?config.keys().collect::<Vec<_>>(),
            "Email delivered to log driver"
        );
        tracing::debug!(text = %email.text, "Email body");
        true
    }
}
