//! Donation model.

use serde::{Deserialize, Serialize};

/// Stored donation record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    /// Document ID
    pub id: String,
    /// Donating user id
    pub donor_id: String,
    /// Sponsored athlete id
    pub athlete_id: String,
    /// Athlete name (denormalized for history listings)
    pub athlete_name: String,
    /// Amount in LKR
    pub amount: f64,
    /// Optional message from the donor
    pub message: Option<String>,
    /// When the donation was made (RFC3339)
    pub donation_date: String,
}
