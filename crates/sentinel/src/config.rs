//! Configuration management for Sentinel.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. TOML file (`config/sentinel.toml` unless `--config` says otherwise)
//! 3. `SENTINEL_*` environment variables, nested with `__`
//!    (e.g. `SENTINEL_VERIFYCODE__CODE_LENGTH=4`), optionally loaded from
//!    `.env` or `.env.{name}`
//! 4. CLI overrides
//!
//! An invalid result is fatal: [`AppConfig::load`] fails and the process
//! never starts serving.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use sentinel_common::constants::{
    CAPTCHA_DEBUG_TTL_MINUTES, CAPTCHA_TTL_MINUTES, CODE_DEBUG_TTL_MINUTES, CODE_TTL_MINUTES,
    DEFAULT_APP_NAME, DEFAULT_CAPTCHA_LENGTH, DEFAULT_CODE_LENGTH, DEFAULT_LISTEN_ADDR,
    DEFAULT_REDIS_URL, MAX_CODE_LENGTH, MAX_TTL_MINUTES,
};
use sentinel_common::{RuntimeMode, SentinelError};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Application identity and runtime mode
    #[serde(default)]
    pub app: AppSection,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Cache backend selection
    #[serde(default)]
    pub store: StoreConfig,

    /// SMS/email verification code settings
    #[serde(default)]
    pub verifycode: VerifyCodeConfig,

    /// CAPTCHA settings
    #[serde(default)]
    pub captcha: CaptchaConfig,

    /// SMS gateway settings
    #[serde(default)]
    pub sms: SmsConfig,

    /// Mail gateway settings
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    /// Used as the root of every cache key
    #[serde(default = "default_app_name")]
    pub name: String,

    /// local, testing, stage or production
    #[serde(default)]
    pub env: RuntimeMode,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: RuntimeMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    /// Shared Redis instance
    #[default]
    Redis,
    /// In-process map (single node only)
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackendKind,
}

/// Verification code configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCodeConfig {
    /// Number of digits
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Code validity in production (minutes)
    #[serde(default = "default_code_ttl")]
    pub expire_minutes: u64,

    /// Code validity outside production (minutes)
    #[serde(default = "default_code_debug_ttl")]
    pub debug_expire_minutes: u64,

    /// Code issued outside production
    #[serde(default = "default_debug_code")]
    pub debug_code: String,

    /// Phone numbers with this prefix skip delivery and always verify
    /// outside production. Empty disables the bypass.
    #[serde(default = "default_debug_phone_prefix")]
    pub debug_phone_prefix: String,

    /// Email addresses with this suffix always verify outside production.
    /// Empty disables the bypass.
    #[serde(default = "default_debug_email_suffix")]
    pub debug_email_suffix: String,
}

impl VerifyCodeConfig {
    pub fn ttl(&self, mode: RuntimeMode) -> Duration {
        let minutes = if mode.is_production() {
            self.expire_minutes
        } else {
            self.debug_expire_minutes
        };
        Duration::from_secs(minutes.saturating_mul(60))
    }
}

impl Default for VerifyCodeConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            expire_minutes: default_code_ttl(),
            debug_expire_minutes: default_code_debug_ttl(),
            debug_code: default_debug_code(),
            debug_phone_prefix: default_debug_phone_prefix(),
            debug_email_suffix: default_debug_email_suffix(),
        }
    }
}

/// CAPTCHA-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaConfig {
    /// Characters in the answer
    #[serde(default = "default_captcha_length")]
    pub length: usize,

    /// Answer validity in production (minutes)
    #[serde(default = "default_captcha_ttl")]
    pub expire_minutes: u64,

    /// Answer validity outside production (minutes)
    #[serde(default = "default_captcha_debug_ttl")]
    pub debug_expire_minutes: u64,

    /// Challenge id that always passes outside production. Empty disables it.
    #[serde(default = "default_captcha_testing_key")]
    pub testing_key: String,
}

impl CaptchaConfig {
    pub fn ttl(&self, mode: RuntimeMode) -> Duration {
        let minutes = if mode.is_production() {
            self.expire_minutes
        } else {
            self.debug_expire_minutes
        };
        Duration::from_secs(minutes.saturating_mul(60))
    }
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            length: default_captcha_length(),
            expire_minutes: default_captcha_ttl(),
            debug_expire_minutes: default_captcha_debug_ttl(),
            testing_key: default_captcha_testing_key(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
    /// Gateway-side template rendering the `code` variable
    #[serde(default = "default_sms_template")]
    pub template_code: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            template_code: default_sms_template(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_mail_from_address")]
    pub from_address: String,

    #[serde(default = "default_mail_from_name")]
    pub from_name: String,

    /// Driver settings handed to the mail sender untouched
    #[serde(default)]
    pub driver: HashMap<String, String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from_address: default_mail_from_address(),
            from_name: default_mail_from_name(),
            driver: HashMap::new(),
        }
    }
}

// Default value functions
fn default_app_name() -> String { DEFAULT_APP_NAME.to_string() }
fn default_redis_url() -> String { DEFAULT_REDIS_URL.to_string() }
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_code_length() -> usize { DEFAULT_CODE_LENGTH }
fn default_code_ttl() -> u64 { CODE_TTL_MINUTES }
fn default_code_debug_ttl() -> u64 { CODE_DEBUG_TTL_MINUTES }
fn default_debug_code() -> String { "123456".to_string() }
fn default_debug_phone_prefix() -> String { "000".to_string() }
fn default_debug_email_suffix() -> String { "@testing.com".to_string() }
fn default_captcha_length() -> usize { DEFAULT_CAPTCHA_LENGTH }
fn default_captcha_ttl() -> u64 { CAPTCHA_TTL_MINUTES }
fn default_captcha_debug_ttl() -> u64 { CAPTCHA_DEBUG_TTL_MINUTES }
fn default_captcha_testing_key() -> String { "captcha_skip_test".to_string() }
fn default_sms_template() -> String { "SMS_VERIFY_CODE".to_string() }
fn default_mail_from_address() -> String { "noreply@example.com".to_string() }
fn default_mail_from_name() -> String { "Sentinel".to_string() }

/// CLI values that take precedence over every other source
#[derive(Debug, Default)]
pub struct Overrides {
    /// Loads `.env.{name}` instead of `.env` when that file exists
    pub env_file: Option<String>,
    pub redis_url: Option<String>,
    pub listen_addr: Option<String>,
}

impl AppConfig {
    /// Load configuration from file and environment, with CLI overrides
    pub fn load(config_path: &str, overrides: &Overrides) -> Result<Self> {
        load_dotenv(overrides.env_file.as_deref());

        if !Path::new(config_path).exists() {
            tracing::warn!(path = %config_path, "Config file not found, using defaults and environment");
        }

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SENTINEL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to load configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;

        if let Some(ref redis_url) = overrides.redis_url {
            config.redis_url = redis_url.clone();
        }
        if let Some(ref listen) = overrides.listen_addr {
            config.listen_addr = listen.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject deployments that could never issue or check a code correctly
    pub fn validate(&self) -> Result<(), SentinelError> {
        if self.app.name.trim().is_empty() {
            return Err(SentinelError::Config("app.name must not be empty".into()));
        }

        let vc = &self.verifycode;
        if vc.code_length == 0 || vc.code_length > MAX_CODE_LENGTH {
            return Err(SentinelError::Config(format!(
                "verifycode.code_length must be between 1 and {MAX_CODE_LENGTH}, got {}",
                vc.code_length
            )));
        }
        check_expiry("verifycode.expire_minutes", vc.expire_minutes)?;
        check_expiry("verifycode.debug_expire_minutes", vc.debug_expire_minutes)?;
        if !self.app.env.is_production()
            && (vc.debug_code.len() != vc.code_length
                || !vc.debug_code.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(SentinelError::Config(format!(
                "verifycode.debug_code must be {} digits",
                vc.code_length
            )));
        }

        let cc = &self.captcha;
        if cc.length == 0 || cc.length > 16 {
            return Err(SentinelError::Config(format!(
                "captcha.length must be between 1 and 16, got {}",
                cc.length
            )));
        }
        check_expiry("captcha.expire_minutes", cc.expire_minutes)?;
        check_expiry("captcha.debug_expire_minutes", cc.debug_expire_minutes)?;

        Ok(())
    }

    /// Namespace for verification code keys
    pub fn verify_code_prefix(&self) -> String {
        format!(
            "{}{}",
            self.app.name,
            sentinel_common::constants::cache_keys::VERIFY_CODE_NAMESPACE
        )
    }

    /// Namespace for CAPTCHA answer keys
    pub fn captcha_prefix(&self) -> String {
        format!(
            "{}{}",
            self.app.name,
            sentinel_common::constants::cache_keys::CAPTCHA_NAMESPACE
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            redis_url: default_redis_url(),
            listen_addr: default_listen_addr(),
            store: StoreConfig::default(),
            verifycode: VerifyCodeConfig::default(),
            captcha: CaptchaConfig::default(),
            sms: SmsConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

fn check_expiry(field: &str, minutes: u64) -> Result<(), SentinelError> {
    if minutes == 0 || minutes > MAX_TTL_MINUTES {
        return Err(SentinelError::Config(format!(
            "{field} must be between 1 and {MAX_TTL_MINUTES}, got {minutes}"
        )));
    }
    Ok(())
}

/// Load `.env.{name}` when it exists, otherwise `.env`. Missing files are fine.
fn load_dotenv(name: Option<&str>) {
    let candidate = name
        .filter(|n| !n.is_empty())
        .map(|n| format!(".env.{n}"))
        .filter(|path| Path::new(path).exists())
        .unwrap_or_else(|| ".env".to_string());

    match dotenvy::from_filename(&candidate) {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(path = %candidate, error = %e, "Failed to read environment file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.verify_code_prefix(), "sentinel:verifycode:");
        assert_eq!(config.captcha_prefix(), "sentinel:captcha:");
    }

    #[test]
    fn test_zero_code_length_is_fatal() {
        let mut config = AppConfig::default();
        config.verifycode.code_length = 0;
        assert!(matches!(config.validate(), Err(SentinelError::Config(_))));
    }

    #[test]
    fn test_zero_ttl_is_fatal() {
        let mut config = AppConfig::default();
        config.captcha.expire_minutes = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.verifycode.debug_expire_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_ttl_is_fatal() {
        let mut config = AppConfig::default();
        config.app.env = RuntimeMode::Production;
        config.verifycode.expire_minutes = u64::MAX / 30;
        assert!(matches!(config.validate(), Err(SentinelError::Config(_))));

        let mut config = AppConfig::default();
        config.captcha.debug_expire_minutes = MAX_TTL_MINUTES + 1;
        assert!(config.validate().is_err());

        config.captcha.debug_expire_minutes = MAX_TTL_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ttl_saturates_instead_of_overflowing() {
        let config = VerifyCodeConfig {
            expire_minutes: u64::MAX,
            ..VerifyCodeConfig::default()
        };
        assert_eq!(
            config.ttl(RuntimeMode::Production),
            Duration::from_secs(u64::MAX)
        );
    }

    #[test]
    fn test_debug_code_must_match_length_outside_production() {
        let mut config = AppConfig::default();
        config.verifycode.code_length = 4;
        assert!(config.validate().is_err());

        config.verifycode.debug_code = "1234".to_string();
        assert!(config.validate().is_ok());

        config.verifycode.debug_code = "abcd".to_string();
        assert!(config.validate().is_err());

        config.app.env = RuntimeMode::Production;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ttl_follows_runtime_mode() {
        let config = AppConfig::default();
        assert_eq!(
            config.verifycode.ttl(RuntimeMode::Production),
            Duration::from_secs(15 * 60)
        );
        assert_eq!(
            config.verifycode.ttl(RuntimeMode::Local),
            Duration::from_secs(10_080 * 60)
        );
        assert!(
            config.captcha.ttl(RuntimeMode::Testing) > config.captcha.ttl(RuntimeMode::Production)
        );
    }

    #[test]
    fn test_toml_sections_deserialize() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [app]
                name = "shop"
                env = "production"

                [store]
                backend = "memory"

                [verifycode]
                code_length = 4
                expire_minutes = 5

                [mail.driver]
                host = "smtp.example.com"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config: AppConfig = settings.try_deserialize().unwrap();
        assert!(config.app.env.is_production());
        assert_eq!(config.store.backend, StoreBackendKind::Memory);
        assert_eq!(config.verifycode.code_length, 4);
        assert_eq!(config.verifycode.ttl(RuntimeMode::Production), Duration::from_secs(300));
        assert_eq!(config.mail.driver.get("host").map(String::as_str), Some("smtp.example.com"));
        assert_eq!(config.verify_code_prefix(), "shop:verifycode:");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_runtime_mode_rejected() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[app]\nenv = \"debug\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        assert!(settings.try_deserialize::<AppConfig>().is_err());
    }
}
