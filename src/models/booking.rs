// SPDX-License-Identifier: MIT
// Copyright 2026 Courtside Developers

//! Booking model for storage and API.

use serde::{Deserialize, Serialize};

/// Stored booking record in Firestore.
///
/// Facility and trainer display fields are denormalized at booking time
/// so listing a user's bookings is a single query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Document ID
    pub id: String,
    /// Owning user id
    pub user_id: String,
    /// Booked facility id
    pub facility_id: String,
    /// Facility name (denormalized)
    pub facility_name: String,
    /// Facility location (denormalized)
    pub facility_location: String,
    /// Trainer name, when a session was booked with one (denormalized)
    pub trainer_name: Option<String>,
    /// Booking date (RFC3339)
    pub date: String,
    /// Slot start, "HH:MM"
    pub start_time: String,
    /// Slot end, "HH:MM"
    pub end_time: String,
    /// "pending", "confirmed", or "cancelled"
    pub status: String,
    /// Total price in LKR
    pub total_price: f64,
    /// When the booking was created (RFC3339)
    pub created_at: String,
}
