// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! Avatar file storage.
//!
//! Files live under `<root>/uploads/avatars/` and are addressed by web
//! path (`/uploads/avatars/<name>`). Deletion is best-effort by
//! contract: a stale file on disk is acceptable, a failed profile
//! update is not.

use crate::error::AppError;
use crate::models::user::DEFAULT_AVATAR;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Web path prefix for stored avatars.
const AVATAR_PREFIX: &str = "/uploads/avatars/";

/// Longest accepted file extension ("jpeg" plus headroom).
const MAX_EXT_LEN: usize = 8;

/// Stores and removes avatar image files.
#[derive(Clone)]
pub struct AvatarStore {
    root: PathBuf,
}

impl AvatarStore {
    pub fn new(root: &str) -> Self {
        Self {
            root: PathBuf::from(root),
        }
    }

    /// Write a new avatar file and return its web path.
    ///
    /// The stored name is a fresh UUID with the upload's (sanitized)
    /// extension, so concurrent uploads never collide.
    pub async fn save(&self, user_id: &str, filename: &str, bytes: &[u8]) -> Result<String, AppError> {
        let ext = sanitize_extension(filename);
        let name = match ext {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        let dir = self.root.join("uploads").join("avatars");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Avatar dir creation failed: {}", e)))?;

        let path = dir.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Avatar write failed: {}", e)))?;

        tracing::info!(
            user_id = %user_id,
            path = %path.display(),
            size = bytes.len(),
            "Avatar stored"
        );

        Ok(format!("{}{}", AVATAR_PREFIX, name))
    }

    /// Delete a previously stored avatar, swallowing every failure.
    ///
    /// This is the explicit best-effort contract for old-file cleanup:
    /// the caller's operation must succeed whether or not the file goes
    /// away. Failures are logged. The shared default avatar and paths
    /// outside the avatar directory are never touched.
    pub async fn delete_best_effort(&self, web_path: &str) {
        if web_path == DEFAULT_AVATAR {
            return;
        }

        let Some(fs_path) = self.resolve(web_path) else {
            tracing::warn!(path = %web_path, "Refusing to delete path outside avatar store");
            return;
        };

        match tokio::fs::remove_file(&fs_path).await {
            Ok(()) => {
                tracing::info!(path = %fs_path.display(), "Previous avatar deleted");
            }
            Err(e) => {
                tracing::warn!(
                    path = %fs_path.display(),
                    error = %e,
                    "Avatar deletion failed, continuing"
                );
            }
        }
    }

    /// Map a web path back to a filesystem path, rejecting anything that
    /// would escape the avatar directory.
    fn resolve(&self, web_path: &str) -> Option<PathBuf> {
        let name = web_path.strip_prefix(AVATAR_PREFIX)?;
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return None;
        }
        Some(self.root.join("uploads").join("avatars").join(name))
    }
}

/// Extract a safe lowercase extension from an uploaded filename.
fn sanitize_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
    if ext.is_empty() || ext.len() > MAX_EXT_LEN {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}
