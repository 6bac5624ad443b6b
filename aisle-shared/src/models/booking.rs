use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authoritative record of one successful seat allocation.
///
/// Records are written once and never rewritten. Cancelling a booking frees
/// the seat but leaves the record in place as history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking_id: Uuid,
    pub passenger_id: String,
    pub flight_id: String,
    pub seat_id: String,
    pub fare_class: String,
    pub booked_at: DateTime<Utc>,
    pub price: f64,
}

impl BookingRecord {
    /// Mint a record with a fresh booking identity
    pub fn new(
        passenger_id: impl Into<String>,
        flight_id: impl Into<String>,
        seat_id: impl Into<String>,
        fare_class: impl Into<String>,
        booked_at: DateTime<Utc>,
        price: f64,
    ) -> Self {
        Self {
            booking_id: Uuid::new_v4(),
            passenger_id: passenger_id.into(),
            flight_id: flight_id.into(),
            seat_id: seat_id.into(),
            fare_class: fare_class.into(),
            booked_at,
            price,
        }
    }
}
