//! # Sentinel Common
//!
//! Shared types, constants, and errors used across Sentinel components.
//!
//! ## Modules
//! - `types` - Core data structures (RuntimeMode, VerificationEntry, CaptchaChallenge, etc.)
//! - `error` - Common error types
//! - `constants` - Shared configuration constants

pub mod constants;
pub mod error;
pub mod types;

pub use error::SentinelError;
pub use types::*;
