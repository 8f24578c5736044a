//! Verification code service.

use sentinel_common::VerificationEntry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::DebugBypass;
use crate::code::CodeGenerator;
use crate::config::{AppConfig, MailConfig};
use crate::delivery::{Email, EmailAddress, MailSender, SmsMessage, SmsSender};
use crate::store::EphemeralStore;

/// Issues codes to phones and email addresses and checks them later.
///
/// A new code for a key replaces the previous one. Checks do not consume the
/// code, so a multi-step flow can re-validate it until it expires.
pub struct VerificationService {
    store: EphemeralStore,
    generator: CodeGenerator,
    bypass: DebugBypass,
    ttl: Duration,
    sms: Arc<dyn SmsSender>,
    mail: Arc<dyn MailSender>,
    sms_template: String,
    mail_config: MailConfig,
}

impl VerificationService {
    pub fn new(
        store: EphemeralStore,
        config: &AppConfig,
        sms: Arc<dyn SmsSender>,
        mail: Arc<dyn MailSender>,
    ) -> Self {
        let mode = config.app.env;
        let vc = &config.verifycode;

        Self {
            store,
            generator: CodeGenerator::new(vc.code_length, mode, vc.debug_code.clone()),
            bypass: DebugBypass::new(mode, vc),
            ttl: vc.ttl(mode),
            sms,
            mail,
            sms_template: config.sms.template_code.clone(),
            mail_config: config.mail.clone(),
        }
    }

    /// Send a code to `phone`. Returns the gateway's verdict, or `false` if
    /// the code could not be stored.
    pub async fn issue_sms(&self, phone: &str) -> bool {
        if self.bypass.is_debug_phone(phone) {
            tracing::debug!(phone = %phone, "Debug phone, skipping store and SMS");
            return true;
        }

        let Some(entry) = self.store_code(phone).await else {
            return false;
        };

        let message = SmsMessage {
            template: self.sms_template.clone(),
            data: HashMap::from([("code".to_string(), entry.code)]),
        };

        let delivered = self.sms.send(phone, &message).await;
        if !delivered {
            tracing::warn!(phone = %phone, "SMS gateway rejected verification code");
        }
        delivered
    }

    /// Send a code to `email`. Same contract as [`issue_sms`](Self::issue_sms).
    pub async fn issue_email(&self, email: &str) -> bool {
        if self.bypass.is_debug_email(email) {
            tracing::debug!(email = %email, "Debug email, skipping store and mail");
            return true;
        }

        let Some(entry) = self.store_code(email).await else {
            return false;
        };

        let message = Email {
            from: EmailAddress {
                address: self.mail_config.from_address.clone(),
                name: self.mail_config.from_name.clone(),
            },
            to: vec![email.to_string()],
            subject: "Email verification code".to_string(),
            text: format!("Your email verification code is {}", entry.code),
            html: format!("<h1>Your email verification code is {}</h1>", entry.code),
        };

        let delivered = self.mail.send(&message, &self.mail_config.driver).await;
        if !delivered {
            tracing::warn!(email = %email, "Mail gateway rejected verification code");
        }
        delivered
    }

    /// Check `answer` for `key` (phone number or email address) without
    /// consuming the code.
    pub async fn check_answer(&self, key: &str, answer: &str) -> bool {
        tracing::debug!(key = %key, answer = %answer, "Checking verification code");

        if self.bypass.matches(key) {
            return true;
        }
        self.store.verify(key, answer, false).await
    }

    async fn store_code(&self, key: &str) -> Option<VerificationEntry> {
        let code = self.generator.generate();

        if let Err(e) = self.store.set(key, &code, self.ttl).await {
            tracing::error!(key = %key, error = %e, "Failed to store verification code");
            return None;
        }

        let entry = VerificationEntry {
            key: key.to_string(),
            code,
            expires_at: crate::store::expires_at(self.ttl),
        };
        tracing::debug!(
            key = %entry.key,
            code = %entry.code,
            expires_at = entry.expires_at,
            "Stored verification code"
        );
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use crate::store::tests::OfflineBackend;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use sentinel_common::RuntimeMode;

    /// Records every SMS and answers with a fixed verdict
    struct RecordingSms {
        accept: bool,
        sent: Mutex<Vec<(String, SmsMessage)>>,
    }

    impl RecordingSms {
        fn new(accept: bool) -> Arc<Self> {
            Arc::new(Self {
                accept,
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SmsSender for RecordingSms {
        async fn send(&self, phone: &str, message: &SmsMessage) -> bool {
            self.sent.lock().push((phone.to_string(), message.clone()));
            self.accept
        }
    }

    #[derive(Default)]
    struct RecordingMail {
        sent: Mutex<Vec<Email>>,
    }

    #[async_trait]
    impl MailSender for RecordingMail {
        async fn send(&self, email: &Email, _config: &HashMap<String, String>) -> bool {
            self.sent.lock().push(email.clone());
            true
        }
    }

    fn config(mode: RuntimeMode) -> AppConfig {
        let mut config = AppConfig::default();
        config.app.env = mode;
        config
    }

    fn service(
        mode: RuntimeMode,
        sms: Arc<RecordingSms>,
    ) -> (VerificationService, EphemeralStore) {
        let store = EphemeralStore::new(Arc::new(MemoryBackend::new()), "app:verifycode:");
        let service = VerificationService::new(
            store.clone(),
            &config(mode),
            sms,
            Arc::new(RecordingMail::default()),
        );
        (service, store)
    }

    #[tokio::test]
    async fn test_issue_sms_stores_and_sends_code() {
        let sms = RecordingSms::new(true);
        let (service, store) = service(RuntimeMode::Production, sms.clone());

        assert!(service.issue_sms("13800000000").await);

        let sent = sms.sent.lock().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "13800000000");
        assert_eq!(sent[0].1.template, "SMS_VERIFY_CODE");

        let code = sent[0].1.data["code"].clone();
        assert_eq!(code.len(), 6);
        assert_eq!(store.get("13800000000", false).await.unwrap(), Some(code.clone()));
        assert!(service.check_answer("13800000000", &code).await);
        assert!(service.check_answer("13800000000", &code).await);
    }

    #[tokio::test]
    async fn test_store_outage_skips_delivery() {
        let sms = RecordingSms::new(true);
        let service = VerificationService::new(
            EphemeralStore::new(Arc::new(OfflineBackend), "app:verifycode:"),
            &config(RuntimeMode::Production),
            sms.clone(),
            Arc::new(RecordingMail::default()),
        );

        assert!(!service.issue_sms("13800000000").await);
        assert!(sms.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_keeps_code_valid() {
        let sms = RecordingSms::new(false);
        let (service, _) = service(RuntimeMode::Production, sms.clone());

        assert!(!service.issue_sms("13800000000").await);

        let code = sms.sent.lock()[0].1.data["code"].clone();
        assert!(service.check_answer("13800000000", &code).await);
    }

    #[tokio::test]
    async fn test_reissue_invalidates_previous_code() {
        let sms = RecordingSms::new(true);
        let (service, store) = service(RuntimeMode::Production, sms.clone());

        assert!(service.issue_sms("13800000000").await);
        let first = sms.sent.lock()[0].1.data["code"].clone();

        let second = if first == "000000" { "111111" } else { "000000" };
        store.set("13800000000", second, Duration::from_secs(60)).await.unwrap();

        assert!(!service.check_answer("13800000000", &first).await);
        assert!(service.check_answer("13800000000", second).await);
    }

    #[tokio::test]
    async fn test_debug_phone_short_circuits_outside_production() {
        let sms = RecordingSms::new(false);
        let (service, store) = service(RuntimeMode::Testing, sms.clone());

        assert!(service.issue_sms("00012345678").await);
        assert!(sms.sent.lock().is_empty());
        assert!(store.get("00012345678", false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_production_issues_debug_code() {
        let sms = RecordingSms::new(true);
        let (service, _) = service(RuntimeMode::Local, sms.clone());

        assert!(service.issue_sms("13800000000").await);
        assert_eq!(sms.sent.lock()[0].1.data["code"], "123456");
        assert!(service.check_answer("13800000000", "123456").await);
    }

    #[tokio::test]
    async fn test_debug_keys_bypass_check_only_outside_production() {
        let (testing, _) = service(RuntimeMode::Testing, RecordingSms::new(true));
        assert!(testing.check_answer("00012345678", "whatever").await);
        assert!(testing.check_answer("qa@testing.com", "whatever").await);
        assert!(!testing.check_answer("13800000000", "whatever").await);

        let (production, _) = service(RuntimeMode::Production, RecordingSms::new(true));
        assert!(!production.check_answer("00012345678", "whatever").await);
        assert!(!production.check_answer("qa@testing.com", "whatever").await);
    }

    #[tokio::test]
    async fn test_issue_email_sends_code_in_body() {
        let mail = Arc::new(RecordingMail::default());
        let store = EphemeralStore::new(Arc::new(MemoryBackend::new()), "app:verifycode:");
        let service = VerificationService::new(
            store,
            &config(RuntimeMode::Production),
            RecordingSms::new(true),
            mail.clone(),
        );

        assert!(service.issue_email("user@example.com").await);

        let sent = mail.sent.lock().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["user@example.com".to_string()]);

        let code: String = sent[0].text.chars().filter(|c| c.is_ascii_digit()).collect();
        assert_eq!(code.len(), 6);
        assert!(sent[0].html.contains(&code));
        assert!(service.check_answer("user@example.com", &code).await);
    }

    #[tokio::test]
    async fn test_debug_email_short_circuits_outside_production() {
        let mail = Arc::new(RecordingMail::default());
        let store = EphemeralStore::new(Arc::new(MemoryBackend::new()), "app:verifycode:");
        let service = VerificationService::new(
            store,
            &config(RuntimeMode::Local),
            RecordingSms::new(true),
            mail.clone(),
        );

        assert!(service.issue_email("qa@testing.com").await);
        assert!(mail.sent.lock().is_empty());
    }
}
