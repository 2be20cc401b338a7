// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! Services module - business logic layer.

pub mod avatars;
pub mod credentials;
pub mod presence;

pub use avatars::AvatarStore;
pub use credentials::CredentialVerifier;
pub use presence::{ConnectionHandle, ConnectionId, PresenceRegistry};
