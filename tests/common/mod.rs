// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

use courtside::config::Config;
use courtside::db::FirestoreDb;
use courtside::routes::create_router;
use courtside::services::{AvatarStore, CredentialVerifier, PresenceRegistry};
use courtside::AppState;
use std::sync::Arc;

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();

    let verifier = CredentialVerifier::new(config.jwt_signing_key.clone(), db.clone());
    let avatars = AvatarStore::new(&config.upload_root);

    let state = Arc::new(AppState {
        config,
        db,
        presence: PresenceRegistry::new(),
        verifier,
        avatars,
    });

    (create_router(state.clone()), state)
}

/// Create a JWT the way the auth routes do.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    courtside::services::credentials::create_jwt(user_id, signing_key)
        .expect("Failed to create JWT")
}
