//! Verification code and CAPTCHA endpoints.

use axum::{Json, extract::State};
use sentinel_common::{CaptchaChallenge, SentinelError};
use serde::{Deserialize, Serialize};

use super::{ApiError, services};
use crate::state::AppState;
use crate::validators::{self, FieldErrors};

/// Issue a new CAPTCHA challenge
pub async fn show_captcha(
    State(state): State<AppState>,
) -> Result<Json<CaptchaChallenge>, ApiError> {
    let services = services(&state).await?;
    let challenge = services.captcha.generate().await?;
    Ok(Json(challenge))
}

#[derive(Deserialize)]
pub struct PhoneRequest {
    #[serde(default)]
    phone: String,
    #[serde(default)]
    captcha_id: String,
    #[serde(default)]
    captcha_answer: String,
}

#[derive(Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    captcha_id: String,
    #[serde(default)]
    captcha_answer: String,
}

#[derive(Serialize)]
pub struct SendResponse {
    success: bool,
}

/// Send an SMS code once the CAPTCHA is solved
pub async fn send_using_phone(
    State(state): State<AppState>,
    Json(payload): Json<PhoneRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let services = services(&state).await?;

    let mut errors = FieldErrors::new();
    validators::validate_phone(&payload.phone, &mut errors);
    // CAPTCHA is only consumed once the other fields are acceptable
    if errors.is_empty() {
        validators::validate_captcha(
            &services.captcha,
            &payload.captcha_id,
            &payload.captcha_answer,
            &mut errors,
        )
        .await;
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if !services.verification.issue_sms(&payload.phone).await {
        return Err(SentinelError::Delivery("failed to send SMS verification code".into()).into());
    }

    Ok(Json(SendResponse { success: true }))
}

/// Send an email code once the CAPTCHA is solved
pub async fn send_using_email(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let services = services(&state).await?;

    let mut errors = FieldErrors::new();
    validators::validate_email(&payload.email, &mut errors);
    if errors.is_empty() {
        validators::validate_captcha(
            &services.captcha,
            &payload.captcha_id,
            &payload.captcha_answer,
            &mut errors,
        )
        .await;
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if !services.verification.issue_email(&payload.email).await {
        return Err(SentinelError::Delivery("failed to send email verification code".into()).into());
    }

    Ok(Json(SendResponse { success: true }))
}

#[derive(Deserialize)]
pub struct CheckRequest {
    /// Phone number or email address
    key: String,
    answer: String,
}

#[derive(Serialize)]
pub struct CheckResponse {
    valid: bool,
}

/// Check a submitted code without consuming it
pub async fn check(
    State(state): State<AppState>,
    Json(payload): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, ApiError> {
    let services = services(&state).await?;
    let valid = services
        .verification
        .check_answer(&payload.key, &payload.answer)
        .await;
    Ok(Json(CheckResponse { valid }))
}
