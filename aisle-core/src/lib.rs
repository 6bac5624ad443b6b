pub mod repository;
pub mod search;

pub use repository::{BookingLedger, LedgerError, LedgerResult};
pub use search::FlightQuery;
