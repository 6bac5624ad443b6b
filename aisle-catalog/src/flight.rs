use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use aisle_shared::{FareClassSummary, SeatSpec};
use crate::inventory::{InventoryError, SeatPartition};

/// A scheduled flight and the seat partitions of its fare classes.
///
/// The partition map only changes when a fare class is added; seat state
/// lives inside each partition behind its own guard.
#[derive(Debug)]
pub struct Flight {
    flight_id: String,
    origin: String,
    destination: String,
    aircraft: String,
    departure: DateTime<Utc>,
    arrival: DateTime<Utc>,
    partitions: RwLock<HashMap<String, Arc<SeatPartition>>>,
}

impl Flight {
    pub fn new(
        flight_id: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        aircraft: impl Into<String>,
        departure: DateTime<Utc>,
        arrival: DateTime<Utc>,
    ) -> Self {
        Self {
            flight_id: flight_id.into(),
            origin: origin.into(),
            destination: destination.into(),
            aircraft: aircraft.into(),
            departure,
            arrival,
            partitions: RwLock::new(HashMap::new()),
        }
    }

    pub fn flight_id(&self) -> &str {
        &self.flight_id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn aircraft(&self) -> &str {
        &self.aircraft
    }

    pub fn departure(&self) -> DateTime<Utc> {
        self.departure
    }

    pub fn arrival(&self) -> DateTime<Utc> {
        self.arrival
    }

    pub fn departs_on(&self, date: NaiveDate) -> bool {
        self.departure.date_naive() == date
    }

    /// Add a fare class. The first registration of a class name wins: a repeat
    /// call leaves the existing partition, base fare and guard untouched and
    /// returns `Ok(false)`.
    pub fn add_fare_class(
        &self,
        fare_class: &str,
        layout: &[Vec<SeatSpec>],
        base_fare: f64,
    ) -> Result<bool, InventoryError> {
        let mut partitions = self.partitions.write().unwrap_or_else(PoisonError::into_inner);

        if partitions.contains_key(fare_class) {
            debug!(flight_id = %self.flight_id, fare_class, "Fare class already configured, keeping original");
            return Ok(false);
        }

        let partition = SeatPartition::from_layout(fare_class, layout, base_fare)?;
        debug!(
            flight_id = %self.flight_id,
            fare_class,
            seats = partition.total_seats(),
            base_fare,
            "Fare class added"
        );
        partitions.insert(fare_class.to_string(), Arc::new(partition));
        Ok(true)
    }

    pub fn partition(&self, fare_class: &str) -> Option<Arc<SeatPartition>> {
        self.partitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(fare_class)
            .cloned()
    }

    pub fn has_fare_class(&self, fare_class: &str) -> bool {
        self.partitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(fare_class)
    }

    /// Fare classes from cheapest to most expensive base fare, ties by name
    pub fn fare_classes(&self) -> Vec<String> {
        self.ordered_partitions()
            .iter()
            .map(|partition| partition.fare_class().to_string())
            .collect()
    }

    /// Per-class totals, in [`Flight::fare_classes`] order. Each partition is
    /// locked on its own, never two at once.
    pub fn inventory_summary(&self) -> Vec<FareClassSummary> {
        self.ordered_partitions()
            .iter()
            .map(|partition| partition.summary())
            .collect()
    }

    fn ordered_partitions(&self) -> Vec<Arc<SeatPartition>> {
        let mut partitions: Vec<Arc<SeatPartition>> = self
            .partitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        partitions.sort_by(|a, b| {
            a.base_fare()
                .total_cmp(&b.base_fare())
                .then_with(|| a.fare_class().cmp(b.fare_class()))
        });
        partitions
    }
}
