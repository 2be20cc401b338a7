//! Facility model. Read-only in this service; facility management is
//! handled elsewhere.

use serde::{Deserialize, Serialize};

/// Sports facility stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    /// Document ID
    pub id: String,
    /// Facility name
    pub name: String,
    /// Human-readable location
    pub location: String,
    /// Sports offered (e.g. "cricket", "swimming")
    pub sport_types: Vec<String>,
    /// Image URLs
    pub images: Vec<String>,
}
