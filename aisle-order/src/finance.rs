use aisle_shared::BookingRecord;

/// Share of the paid price returned on cancellation
pub const REFUND_RATE: f64 = 0.80;

/// Refund owed for a booking, computed from the stored price.
///
/// Quote it before calling `cancel_booking`.
pub fn refund_amount(record: &BookingRecord) -> f64 {
    record.price * REFUND_RATE
}
