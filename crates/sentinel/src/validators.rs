//! Request field validation.
//!
//! Validators append messages to a [`FieldErrors`] map keyed by field name;
//! an empty map means the request is acceptable.

use sentinel_common::constants::fields;
use std::collections::BTreeMap;

use crate::captcha::CaptchaService;

pub type FieldErrors = BTreeMap<String, Vec<String>>;

fn push(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// Phone numbers are exactly 11 digits
pub fn validate_phone(phone: &str, errors: &mut FieldErrors) {
    if phone.is_empty() {
        push(errors, fields::PHONE, "phone is required");
    } else if phone.len() != 11 || !phone.chars().all(|c| c.is_ascii_digit()) {
        push(errors, fields::PHONE, "phone must be 11 digits");
    }
}

pub fn validate_email(email: &str, errors: &mut FieldErrors) {
    if email.is_empty() {
        push(errors, fields::EMAIL, "email is required");
        return;
    }
    if !(4..=64).contains(&email.len()) {
        push(errors, fields::EMAIL, "email must be between 4 and 64 characters");
    }

    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !well_formed {
        push(errors, fields::EMAIL, "email is not a valid address");
    }
}

/// Consumes the CAPTCHA challenge; a wrong answer adds an error.
pub async fn validate_captcha(
    captcha: &CaptchaService,
    captcha_id: &str,
    captcha_answer: &str,
    errors: &mut FieldErrors,
) {
    if !captcha.verify(captcha_id, captcha_answer).await {
        push(errors, fields::CAPTCHA_ANSWER, "incorrect captcha");
    }
}
