//! Debug shortcuts for automated end-to-end tests.

use sentinel_common::RuntimeMode;

use crate::config::VerifyCodeConfig;

/// Decides whether a phone number or email address skips real delivery and
/// verification. Built once from the runtime mode; in production every
/// predicate is false. Empty patterns never match.
#[derive(Debug, Clone)]
pub struct DebugBypass {
    active: bool,
    phone_prefix: String,
    email_suffix: String,
}

impl DebugBypass {
    pub fn new(mode: RuntimeMode, config: &VerifyCodeConfig) -> Self {
        Self {
            active: !mode.is_production(),
            phone_prefix: config.debug_phone_prefix.clone(),
            email_suffix: config.debug_email_suffix.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_debug_phone(&self, phone: &str) -> bool {
        self.active && !self.phone_prefix.is_empty() && phone.starts_with(&self.phone_prefix)
    }

    pub fn is_debug_email(&self, email: &str) -> bool {
        self.active && !self.email_suffix.is_empty() && email.ends_with(&self.email_suffix)
    }

    /// `key` may be either a phone number or an email address
    pub fn matches(&self, key: &str) -> bool {
        self.is_debug_phone(key) || self.is_debug_email(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inert_in_production() {
        let bypass = DebugBypass::new(RuntimeMode::Production, &VerifyCodeConfig::default());
        assert!(!bypass.is_active());
        assert!(!bypass.matches("00012345678"));
        assert!(!bypass.matches("qa@testing.com"));
    }

    #[test]
    fn test_prefix_and_suffix_outside_production() {
        let bypass = DebugBypass::new(RuntimeMode::Local, &VerifyCodeConfig::default());
        assert!(bypass.is_debug_phone("00012345678"));
        assert!(!bypass.is_debug_phone("13800000000"));
        assert!(bypass.is_debug_email("qa@testing.com"));
        assert!(!bypass.is_debug_email("qa@example.com"));
        assert!(bypass.matches("qa@testing.com"));
    }

    #[test]
    fn test_empty_patterns_never_match() {
        let config = VerifyCodeConfig {
            debug_phone_prefix: String::new(),
            debug_email_suffix: String::new(),
            ..Default::default()
        };
        let bypass = DebugBypass::new(RuntimeMode::Testing, &config);
        assert!(!bypass.matches("13800000000"));
        assert!(!bypass.matches("user@example.com"));
    }
}
