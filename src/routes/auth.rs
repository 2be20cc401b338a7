// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! Account registration, login, and password-reset routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::User;
use crate::routes::users::UserResponse;
use crate::services::credentials::{create_jwt, hash_password, verify_password};
use crate::time_utils::{format_utc_rfc3339, now_rfc3339};
use crate::AppState;

/// How long a password-reset token stays valid, in hours.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Public auth routes (no session required).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/forgotpassword", post(forgot_password))
        .route("/auth/resetpassword", put(reset_password))
}

/// Auth routes that require a session (mounted behind `require_auth`).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/me", get(get_me))
}

/// Session token plus the profile it belongs to.
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

// ─── Registration ────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    name: String,
    #[validate(email(message = "A valid email is required"))]
    email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    password: String,
}

/// Create a new account and start a session.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        email,
        phone: None,
        address: None,
        avatar: None,
        sport_preferences: vec![],
        role: "user".to_string(),
        favorites: vec![],
        created_at: now_rfc3339(),
        password_hash: hash_password(&payload.password)?,
        reset_token_hash: None,
        reset_token_expires_at: None,
    };

    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "User registered");

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from_user(&user),
        }),
    ))
}

// ─── Login ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

/// Exchange credentials for a session token.
///
/// An unknown email and a wrong password produce the same response, so
/// login cannot be used to probe which emails have accounts.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let email = payload.email.trim().to_lowercase();

    let user = state
        .db
        .get_user_by_email(&email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(AppError::Unauthorized);
    }

    tracing::info!(user_id = %user.id, "User logged in");

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from_user(&user),
    }))
}

// ─── Current User ────────────────────────────────────────────

/// Get the profile behind the current session.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(UserResponse::from_user(&profile)))
}

// ─── Password Reset ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    email: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Begin a password reset.
///
/// Always answers with the same message; whether the account exists is
/// never revealed. Delivery of the token (email) is an external
/// collaborator's job — this handler only records its digest.
async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let email = payload.email.trim().to_lowercase();

    if let Some(mut user) = state.db.get_user_by_email(&email).await? {
        let token = Uuid::new_v4().to_string();
        let expires_at = chrono::Utc::now() + chrono::Duration::hours(RESET_TOKEN_TTL_HOURS);

        user.reset_token_hash = Some(digest_reset_token(&token));
        user.reset_token_expires_at = Some(format_utc_rfc3339(expires_at));
        state.db.upsert_user(&user).await?;

        tracing::info!(user_id = %user.id, "Password reset token issued");
    } else {
        tracing::debug!("Password reset requested for unknown email");
    }

    Ok(Json(MessageResponse {
        message: "If that account exists, a reset link has been sent".to_string(),
    }))
}

#[derive(Deserialize, Validate)]
pub struct ResetPasswordRequest {
    token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    password: String,
}

/// Complete a password reset with a previously issued token.
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut user = state
        .db
        .get_user_by_reset_token(&digest_reset_token(&payload.token))
        .await?
        .ok_or(AppError::InvalidToken)?;

    let still_valid = user
        .reset_token_expires_at
        .as_deref()
        .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
        .is_some_and(|expires| chrono::Utc::now() < expires);

    if !still_valid {
        tracing::debug!(user_id = %user.id, "Expired reset token presented");
        return Err(AppError::InvalidToken);
    }

    user.password_hash = hash_password(&payload.password)?;
    user.reset_token_hash = None;
    user.reset_token_expires_at = None;
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "Password reset completed");

    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}

/// SHA-256 digest of a reset token; only the digest is stored.
fn digest_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
