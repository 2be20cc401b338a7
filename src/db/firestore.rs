// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles, favorites, credentials)
//! - Facilities (read-only lookups for favorites)
//! - Bookings, financial-aid applications, donations (identity-scoped
//!   history queries)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Booking, Donation, Facility, FinancialAidApplication, User};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // ExternalJwtFunctionSource provides a dummy token without needing
        // a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by document id.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by email address. Emails are unique across users.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let matches: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches.into_iter().next())
    }

    /// Find the user holding an outstanding reset token digest.
    pub async fn get_user_by_reset_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, AppError> {
        let token_hash = token_hash.to_string();
        let matches: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("reset_token_hash").eq(token_hash.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches.into_iter().next())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Facility Operations ─────────────────────────────────────

    /// Get a facility by document id.
    pub async fn get_facility(&self, facility_id: &str) -> Result<Option<Facility>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::FACILITIES)
            .obj()
            .one(facility_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch facilities for a list of ids, preserving the input order.
    ///
    /// Ids that no longer resolve are skipped rather than failing the
    /// whole request; a user's favorites may reference a facility that
    /// was removed.
    pub async fn get_facilities_by_ids(
        &self,
        facility_ids: &[String],
    ) -> Result<Vec<Facility>, AppError> {
        let client = self.get_client()?;

        let results: Vec<Result<Option<Facility>, AppError>> =
            stream::iter(facility_ids.to_vec())
                .map(|id| async move {
                    client
                        .fluent()
                        .select()
                        .by_id_in(collections::FACILITIES)
                        .obj()
                        .one(&id)
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))
                })
                .buffered(MAX_CONCURRENT_DB_OPS)
                .collect()
                .await;

        let mut facilities = Vec::with_capacity(facility_ids.len());
        for result in results {
            if let Some(facility) = result? {
                facilities.push(facility);
            }
        }

        Ok(facilities)
    }

    // ─── Booking Operations ──────────────────────────────────────

    /// Get all bookings owned by a user, most recent date first.
    pub async fn get_bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::BOOKINGS)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Financial Aid Operations ────────────────────────────────

    /// Get a user's financial-aid applications, newest first.
    pub async fn get_financial_aid_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<FinancialAidApplication>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FINANCIAL_AID)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Donation Operations ─────────────────────────────────────

    /// Get a user's donation history, newest first.
    pub async fn get_donations_for_user(
        &self,
        donor_id: &str,
    ) -> Result<Vec<Donation>, AppError> {
        let donor_id = donor_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::DONATIONS)
            .filter(move |q| q.field("donor_id").eq(donor_id.clone()))
            .order_by([(
                "donation_date",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
