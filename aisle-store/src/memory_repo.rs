use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;
use aisle_core::{BookingLedger, LedgerError, LedgerResult};
use aisle_shared::BookingRecord;

/// Process-local ledger. Records live for the lifetime of the value.
#[derive(Debug, Default)]
pub struct InMemoryBookingLedger {
    records: RwLock<HashMap<Uuid, BookingRecord>>,
}

impl InMemoryBookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn collect<F>(&self, keep: F) -> Vec<BookingRecord>
    where
        F: Fn(&BookingRecord) -> bool,
    {
        let mut matching: Vec<BookingRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|record| keep(record))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            a.booked_at
                .cmp(&b.booked_at)
                .then_with(|| a.booking_id.cmp(&b.booking_id))
        });
        matching
    }
}

#[async_trait]
impl BookingLedger for InMemoryBookingLedger {
    async fn save(&self, record: &BookingRecord) -> LedgerResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.booking_id) {
            return Err(LedgerError::AlreadyExists(record.booking_id));
        }
        records.insert(record.booking_id, record.clone());
        Ok(())
    }

    async fn get(&self, booking_id: Uuid) -> LedgerResult<Option<BookingRecord>> {
        Ok(self.records.read().await.get(&booking_id).cloned())
    }

    async fn list_by_passenger(&self, passenger_id: &str) -> LedgerResult<Vec<BookingRecord>> {
        Ok(self.collect(|record| record.passenger_id == passenger_id).await)
    }

    async fn list_by_flight(&self, flight_id: &str) -> LedgerResult<Vec<BookingRecord>> {
        Ok(self.collect(|record| record.flight_id == flight_id).await)
    }
}
