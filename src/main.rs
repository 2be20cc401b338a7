// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! Courtside API Server
//!
//! Serves the booking platform's CRUD API and the realtime presence
//! channel over a single listener.

use courtside::{
    config::Config,
    db::FirestoreDb,
    services::{AvatarStore, CredentialVerifier, PresenceRegistry},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Courtside API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Presence registry starts empty; it only ever reflects connections
    // made during this process's lifetime.
    let presence = PresenceRegistry::new();

    let verifier = CredentialVerifier::new(config.jwt_signing_key.clone(), db.clone());

    let avatars = AvatarStore::new(&config.upload_root);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        presence,
        verifier,
        avatars,
    });

    // Build router
    let app = courtside::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("courtside=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
