//! Shared constants for Sentinel components.

/// Default Redis connection URL
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Default application name, used as the cache namespace root
pub const DEFAULT_APP_NAME: &str = "sentinel";

/// Default verification code length (digits)
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Longest verification code we accept from configuration
pub const MAX_CODE_LENGTH: usize = 12;

/// Verification code expiry in production (minutes)
pub const CODE_TTL_MINUTES: u64 = 15;

/// Verification code expiry outside production (one week)
pub const CODE_DEBUG_TTL_MINUTES: u64 = 10_080;

/// CAPTCHA answer expiry in production (minutes)
pub const CAPTCHA_TTL_MINUTES: u64 = 15;

/// CAPTCHA answer expiry outside production (one week)
pub const CAPTCHA_DEBUG_TTL_MINUTES: u64 = 10_080;

/// Longest expiry accepted from configuration (one year, in minutes)
pub const MAX_TTL_MINUTES: u64 = 60 * 24 * 365;

/// Default CAPTCHA answer length
pub const DEFAULT_CAPTCHA_LENGTH: usize = 6;

/// Cache key namespaces, appended to the application name.
/// Full key: {app_name}{namespace}{key}
pub mod cache_keys {
    /// SMS/email verification codes: {app}:verifycode:{phone|email}
    pub const VERIFY_CODE_NAMESPACE: &str = ":verifycode:";

    /// CAPTCHA answers: {app}:captcha:{captcha_id}
    pub const CAPTCHA_NAMESPACE: &str = ":captcha:";
}

/// Field names used in validation error maps
pub mod fields {
    pub const CAPTCHA_ANSWER: &str = "captcha_answer";
    pub const PHONE: &str = "phone";
    pub const EMAIL: &str = "email";
}
