//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Avatar path served when a user has not uploaded their own.
/// Ships with the frontend; never deleted by the avatar store.
pub const DEFAULT_AVATAR: &str = "/images/default-avatar.png";

/// User profile stored in Firestore.
///
/// `favorites` holds facility document ids with set semantics: no
/// duplicates, insertion order preserved for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document ID (UUID v4, assigned at registration)
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address (unique across users)
    pub email: String,
    /// Phone number
    pub phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Web path of the uploaded avatar, if any
    pub avatar: Option<String>,
    /// Sports the user is interested in
    pub sport_preferences: Vec<String>,
    /// Role: "user" or "admin"
    pub role: String,
    /// Favorite facility ids
    pub favorites: Vec<String>,
    /// When the account was created (RFC3339)
    pub created_at: String,
    /// Argon2id password hash. Never serialized into API responses.
    pub password_hash: String,
    /// SHA-256 digest of the outstanding password-reset token
    pub reset_token_hash: Option<String>,
    /// When the reset token stops being valid (RFC3339)
    pub reset_token_expires_at: Option<String>,
}

impl User {
    /// Add a facility to favorites. Returns `false` if it was already
    /// present (the set is left unchanged).
    pub fn add_favorite(&mut self, facility_id: &str) -> bool {
        if self.favorites.iter().any(|id| id == facility_id) {
            return false;
        }
        self.favorites.push(facility_id.to_string());
        true
    }

    /// Remove a facility from favorites. Returns `false` if it was not
    /// present.
    pub fn remove_favorite(&mut self, facility_id: &str) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|id| id != facility_id);
        self.favorites.len() != before
    }

    /// Whether the stored avatar is a real uploaded file (as opposed to
    /// unset or the shared default image).
    pub fn has_uploaded_avatar(&self) -> bool {
        matches!(&self.avatar, Some(path) if path != DEFAULT_AVATAR)
    }
}
