//! Financial-aid application model.

use serde::{Deserialize, Serialize};

/// Stored financial-aid application in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialAidApplication {
    /// Document ID
    pub id: String,
    /// Applying user id
    pub user_id: String,
    /// Facility the aid is requested for
    pub facility_id: String,
    /// Applicant's statement
    pub reason: String,
    /// Requested amount in LKR
    pub requested_amount: f64,
    /// "pending", "approved", or "rejected"
    pub status: String,
    /// When the application was submitted (RFC3339)
    pub created_at: String,
}
