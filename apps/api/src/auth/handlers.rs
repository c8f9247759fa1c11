use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::mailer::{otp_email, password_reset_email};
use crate::auth::otp::{generate_otp, otp_expiry, pending_otp, OtpRejection};
use crate::auth::password::{hash_secret, verify_secret};
use crate::auth::store::{self, NewUser};
use crate::auth::token::{issue_token, AuthUser};
use crate::auth::username::{
    is_valid_username, normalize_email, normalize_username, INVALID_USERNAME,
};
use crate::errors::AppError;
use crate::models::user::{UserProfile, UserRow};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub message: &'static str,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub new_password: String,
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let email = normalize_email(&req.email);
    let username = normalize_username(&req.username);
    let name = req.name.trim();

    if !is_valid_username(&username) {
        return Err(AppError::Validation(INVALID_USERNAME.to_string()));
    }
    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Name, email and password are required".to_string(),
        ));
    }
    if store::username_exists(&state.db, &username).await? {
        return Err(AppError::Validation("Username is already taken".to_string()));
    }
    if store::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Validation("User already exists".to_string()));
    }

    let password_hash = hash_secret(&req.password).await?;
    let user = store::insert_user(
        &state.db,
        NewUser {
            name,
            username: &username,
            email: &email,
            password_hash: &password_hash,
        },
    )
    .await?;

    info!("Registered user {} ({})", user.id, user.username);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());
    let email = normalize_email(&req.email);

    let user = store::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid)?;
    if !verify_secret(&req.password, &user.password_hash).await? {
        return Err(invalid());
    }

    let token = issue_token(user.id, &state.config.jwt_secret, state.config.jwt_expire)?;
    Ok(Json(LoginResponse {
        token,
        username: user.username,
        message: "Login Successfully !",
    }))
}

/// GET /api/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let row = store::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(row.into()))
}

/// GET /api/auth/check-username/:username
pub async fn handle_check_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, AppError> {
    let username = normalize_username(&username);
    if !is_valid_username(&username) {
        return Ok(Json(
            json!({ "available": false, "message": "Invalid username format" }),
        ));
    }
    let taken = store::username_exists(&state.db, &username).await?;
    Ok(Json(json!({ "available": !taken })))
}

/// POST /api/auth/forgot-password
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let email = normalize_email(&req.email);
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    let user = store::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("No account found with this email".to_string()))?;

    let otp = generate_otp();
    let otp_hash = hash_secret(&otp).await?;
    store::set_reset_otp(&state.db, user.id, &otp_hash, otp_expiry(Utc::now())).await?;

    state.mailer.send(otp_email(&email, &user.name, &otp)).await?;
    info!("Issued password reset OTP for user {}", user.id);

    Ok(Json(json!({
        "success": true,
        "message": "OTP sent to your email. Valid for 10 minutes."
    })))
}

/// Loads the user and checks the submitted OTP against the pending one.
async fn check_otp(state: &AppState, email: &str, otp: &str) -> Result<UserRow, AppError> {
    let user = store::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let hash = pending_otp(
        user.reset_otp_hash.as_deref(),
        user.reset_otp_expires_at,
        Utc::now(),
    )
    .map_err(|r| AppError::Validation(r.message().to_string()))?;

    if !verify_secret(otp.trim(), hash).await? {
        return Err(AppError::Validation(
            OtpRejection::Invalid.message().to_string(),
        ));
    }
    Ok(user)
}

/// POST /api/auth/verify-otp
pub async fn handle_verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<Value>, AppError> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.otp.trim().is_empty() {
        return Err(AppError::Validation(
            "Email and OTP are required".to_string(),
        ));
    }

    check_otp(&state, &email, &req.otp).await?;

    Ok(Json(json!({
        "success": true,
        "message": "OTP verified successfully. You can now reset your password."
    })))
}

/// POST /api/auth/reset-password
pub async fn handle_reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.otp.trim().is_empty() || req.new_password.is_empty() {
        return Err(AppError::Validation(
            "Email, OTP, and new password are required".to_string(),
        ));
    }
    if req.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    let user = check_otp(&state, &email, &req.otp).await?;
    let password_hash = hash_secret(&req.new_password).await?;
    store::reset_password(&state.db, user.id, &password_hash).await?;
    info!("Password reset for user {}", user.id);

    if let Err(e) = state
        .mailer
        .send(password_reset_email(&email, &user.name))
        .await
    {
        warn!("Password reset confirmation email failed: {e}");
    }

    Ok(Json(json!({
        "success": true,
        "message": "Password reset successful. You can now login with your new password."
    })))
}
