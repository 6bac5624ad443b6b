use uuid::Uuid;
use aisle_catalog::InventoryError;
use aisle_core::LedgerError;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Flight not found: {0}")]
    FlightNotFound(String),

    #[error("No seat available in {fare_class} on flight {flight_id}")]
    NoSeatAvailable {
        flight_id: String,
        fare_class: String,
    },

    #[error("Booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("Fare class setup failed: {0}")]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl BookingError {
    pub(crate) fn no_seat(flight_id: &str, fare_class: &str) -> Self {
        Self::NoSeatAvailable {
            flight_id: flight_id.to_string(),
            fare_class: fare_class.to_string(),
        }
    }
}
