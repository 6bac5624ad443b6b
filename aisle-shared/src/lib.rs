pub mod models;

pub use models::booking::BookingRecord;
pub use models::layout::{FareClassSummary, SeatLayout, SeatSpec};
