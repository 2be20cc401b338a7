// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! Routes for the authenticated user's own resources: profile, avatar,
//! bookings, favorites, financial aid, and donation history.
//!
//! Every handler is scoped to the identity in the request extension; no
//! route accepts another user's id.

use axum::{
    extract::{Multipart, Path, State},
    routing::{delete, get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Booking, Donation, Facility, FinancialAidApplication, User};
use crate::AppState;

/// User routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route(
            "/profile/avatar",
            put(update_avatar).delete(remove_avatar),
        )
        .route("/bookings", get(get_bookings))
        .route("/favorites", get(get_favorites).post(add_favorite))
        .route("/favorites/{facility_id}", delete(remove_favorite))
        .route("/financial-aid", get(get_financial_aid))
        .route("/donations/history", get(get_donation_history))
}

// ─── Profile ─────────────────────────────────────────────────

/// Profile view returned by every profile-shaped endpoint. Credential
/// and reset fields never leave the storage model.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar: Option<String>,
    pub sport_preferences: Vec<String>,
    pub role: String,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            avatar: user.avatar.clone(),
            sport_preferences: user.sport_preferences.clone(),
            role: user.role.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

/// Fetch the caller's own user document, or 404 if the account is gone.
async fn load_own_user(state: &AppState, user_id: &str) -> Result<User> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

/// Get current user profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = load_own_user(&state, &user.user_id).await?;
    Ok(Json(UserResponse::from_user(&profile)))
}

/// Distinguishes an absent field from an explicit `null`: absent fields
/// stay untouched, `null` clears the stored value.
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must not be empty"))]
    name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    address: Option<Option<String>>,
    sport_preferences: Option<Vec<String>>,
}

/// Update current user profile. Only the provided fields change.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut profile = load_own_user(&state, &user.user_id).await?;

    if let Some(name) = payload.name {
        profile.name = name.trim().to_string();
    }
    if let Some(email) = payload.email {
        profile.email = email.trim().to_lowercase();
    }
    if let Some(phone) = payload.phone {
        profile.phone = phone;
    }
    if let Some(address) = payload.address {
        profile.address = address;
    }
    if let Some(sport_preferences) = payload.sport_preferences {
        profile.sport_preferences = sport_preferences;
    }

    state.db.upsert_user(&profile).await?;

    tracing::debug!(user_id = %profile.id, "Profile updated");

    Ok(Json(UserResponse::from_user(&profile)))
}

// ─── Avatar ──────────────────────────────────────────────────

/// Replace the user's avatar with an uploaded image.
///
/// The previous file is removed best-effort before the new one is
/// written; a failed deletion never fails the update.
async fn update_avatar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<UserResponse>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let filename = field.file_name().unwrap_or("avatar").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Upload failed: {}", e)))?;

        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) = upload.ok_or_else(|| {
        AppError::BadRequest("No file uploaded".to_string())
    })?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    let mut profile = load_own_user(&state, &user.user_id).await?;

    // Clean up the file being replaced, if it was a real upload.
    if profile.has_uploaded_avatar() {
        if let Some(old_path) = profile.avatar.clone() {
            state.avatars.delete_best_effort(&old_path).await;
        }
    }

    let web_path = state.avatars.save(&profile.id, &filename, &bytes).await?;
    profile.avatar = Some(web_path);

    state.db.upsert_user(&profile).await?;

    Ok(Json(UserResponse::from_user(&profile)))
}

/// Remove the user's avatar, falling back to the shared default.
///
/// When no avatar was uploaded there is nothing to delete and the
/// handler only clears the field.
async fn remove_avatar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let mut profile = load_own_user(&state, &user.user_id).await?;

    if profile.has_uploaded_avatar() {
        if let Some(old_path) = profile.avatar.clone() {
            state.avatars.delete_best_effort(&old_path).await;
        }
    }

    profile.avatar = None;
    state.db.upsert_user(&profile).await?;

    Ok(Json(UserResponse::from_user(&profile)))
}

// ─── Bookings ────────────────────────────────────────────────

/// Get the caller's bookings, most recent date first.
async fn get_bookings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Booking>>> {
    let bookings = state.db.get_bookings_for_user(&user.user_id).await?;

    tracing::debug!(
        user_id = %user.user_id,
        count = bookings.len(),
        "Fetched bookings"
    );

    Ok(Json(bookings))
}

// ─── Favorites ───────────────────────────────────────────────

/// Load the facility documents behind a user's favorite ids.
async fn populated_favorites(state: &AppState, user: &User) -> Result<Vec<Facility>> {
    state.db.get_facilities_by_ids(&user.favorites).await
}

/// Get the caller's favorite facilities, populated.
async fn get_favorites(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Facility>>> {
    let profile = load_own_user(&state, &user.user_id).await?;
    let favorites = populated_favorites(&state, &profile).await?;
    Ok(Json(favorites))
}

#[derive(Deserialize)]
pub struct AddFavoriteRequest {
    facility_id: String,
}

/// Add a facility to the caller's favorites.
async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<AddFavoriteRequest>,
) -> Result<Json<Vec<Facility>>> {
    if payload.facility_id.is_empty() {
        return Err(AppError::BadRequest("Facility ID is required".to_string()));
    }

    if state.db.get_facility(&payload.facility_id).await?.is_none() {
        return Err(AppError::NotFound("Facility not found".to_string()));
    }

    let mut profile = load_own_user(&state, &user.user_id).await?;

    if !profile.add_favorite(&payload.facility_id) {
        return Err(AppError::BadRequest(
            "Facility already in favorites".to_string(),
        ));
    }

    state.db.upsert_user(&profile).await?;

    tracing::debug!(
        user_id = %profile.id,
        facility_id = %payload.facility_id,
        "Favorite added"
    );

    let favorites = populated_favorites(&state, &profile).await?;
    Ok(Json(favorites))
}

/// Remove a facility from the caller's favorites.
async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(facility_id): Path<String>,
) -> Result<Json<Vec<Facility>>> {
    let mut profile = load_own_user(&state, &user.user_id).await?;

    if !profile.remove_favorite(&facility_id) {
        return Err(AppError::BadRequest(
            "Facility not in favorites".to_string(),
        ));
    }

    state.db.upsert_user(&profile).await?;

    tracing::debug!(
        user_id = %profile.id,
        facility_id = %facility_id,
        "Favorite removed"
    );

    let favorites = populated_favorites(&state, &profile).await?;
    Ok(Json(favorites))
}

// ─── Financial Aid ───────────────────────────────────────────

/// Get the caller's financial-aid applications, newest first.
async fn get_financial_aid(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<FinancialAidApplication>>> {
    let applications = state.db.get_financial_aid_for_user(&user.user_id).await?;
    Ok(Json(applications))
}

// ─── Donations ───────────────────────────────────────────────

/// Get the caller's donation history, newest first.
async fn get_donation_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Donation>>> {
    let donations = state.db.get_donations_for_user(&user.user_id).await?;
    Ok(Json(donations))
}
