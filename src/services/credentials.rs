// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! Session-token creation and verification.
//!
//! Both the HTTP auth middleware and the realtime gateway resolve
//! identities through this module, so a token means the same thing on
//! either channel.

use crate::db::FirestoreDb;
use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Session lifetime: 30 days.
const TOKEN_TTL_SECS: usize = 30 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user document id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Create a JWT for a user session.
pub fn create_jwt(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Decode and validate a session token, returning the subject identity.
///
/// Structural, signature, and expiry checks only; does not touch the
/// database. Every failure collapses into `AppError::InvalidToken`.
pub fn decode_token(token: &str, signing_key: &[u8]) -> Result<String, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Token validation failed");
        AppError::InvalidToken
    })?;

    Ok(token_data.claims.sub)
}

/// Hash a plaintext password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored Argon2id hash.
///
/// Returns `Ok(true)` on a match, `Ok(false)` on a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Resolves bearer tokens to verified user identities.
///
/// Verification is deliberately all-or-nothing: a malformed token, a bad
/// signature, an expired token, and a subject with no account all
/// produce the same `InvalidToken` outcome, so callers cannot probe for
/// account existence.
#[derive(Clone)]
pub struct CredentialVerifier {
    jwt_signing_key: Vec<u8>,
    db: FirestoreDb,
}

impl CredentialVerifier {
    pub fn new(jwt_signing_key: Vec<u8>, db: FirestoreDb) -> Self {
        Self {
            jwt_signing_key,
            db,
        }
    }

    /// Token-level validation only (no database access).
    pub fn decode(&self, token: &str) -> Result<String, AppError> {
        decode_token(token, &self.jwt_signing_key)
    }

    /// Full verification: token validity plus account existence.
    pub async fn verify(&self, token: &str) -> Result<String, AppError> {
        let user_id = self.decode(token)?;

        let exists = self
            .db
            .get_user(&user_id)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Account lookup failed during verification");
                AppError::InvalidToken
            })?
            .is_some();

        if !exists {
            tracing::debug!(user_id = %user_id, "Token subject has no account");
            return Err(AppError::InvalidToken);
        }

        Ok(user_id)
    }
}
