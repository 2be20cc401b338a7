// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! Courtside: sports-facility booking platform backend
//!
//! This crate provides the HTTP API for user profiles, bookings,
//! favorites, financial aid, and donations, plus a WebSocket channel
//! that tracks which users currently have a live connection.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{AvatarStore, CredentialVerifier, PresenceRegistry};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub presence: PresenceRegistry,
    pub verifier: CredentialVerifier,
    pub avatars: AvatarStore,
}
