use async_trait::async_trait;
use uuid::Uuid;
use aisle_shared::BookingRecord;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Booking already recorded: {0}")]
    AlreadyExists(Uuid),

    #[error("Booking record could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Ledger backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Keyed store of booking records.
///
/// Implementations own their internal synchronisation; callers treat every
/// method as an atomic read or write.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Persist a new record. Records are immutable once saved.
    async fn save(&self, record: &BookingRecord) -> LedgerResult<()>;

    async fn get(&self, booking_id: Uuid) -> LedgerResult<Option<BookingRecord>>;

    /// Every record ever written for a passenger, oldest first
    async fn list_by_passenger(&self, passenger_id: &str) -> LedgerResult<Vec<BookingRecord>>;

    /// Every record ever written for a flight, oldest first
    async fn list_by_flight(&self, flight_id: &str) -> LedgerResult<Vec<BookingRecord>>;
}
