//! # Sentinel - ephemeral verification secrets
//!
//! Issues and checks short-lived one-time secrets: SMS/email verification
//! codes and image CAPTCHA answers, kept in a shared TTL cache.
//!
//! ## Architecture
//! ```text
//! HTTP → routes → VerificationService ─┬→ EphemeralStore → Redis
//!              └→ CaptchaService ──────┘
//!                         ↓
//!                 SmsSender / MailSender
//! ```

pub mod captcha;
pub mod code;
pub mod config;
pub mod delivery;
pub mod routes;
pub mod state;
pub mod store;
pub mod validators;
pub mod verification;
