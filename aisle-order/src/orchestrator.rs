use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;
use aisle_catalog::{
    Allocation, BestSeatSelector, Flight, InventoryError, PricingEngine, SeatSelector,
};
use aisle_core::{BookingLedger, FlightQuery};
use aisle_shared::{BookingRecord, SeatSpec};
use crate::error::BookingError;
use crate::priority::ClassPriority;

/// Prior bookings needed before a passenger counts as a loyalty member
pub const LOYALTY_THRESHOLD: usize = 5;

pub fn qualifies_for_loyalty(prior_bookings: usize) -> bool {
    prior_bookings >= LOYALTY_THRESHOLD
}

/// Books and cancels seats across every registered flight.
///
/// Partition guards are only held while a seat is picked, marked or freed.
/// Ledger calls always happen with no guard held, and the upgrade path drops
/// the first guard before touching the second partition.
pub struct BookingOrchestrator {
    ledger: Arc<dyn BookingLedger>,
    flights: RwLock<HashMap<String, Arc<Flight>>>,
    class_priority: RwLock<ClassPriority>,
    selector: Arc<dyn SeatSelector>,
    pricing: PricingEngine,
}

impl BookingOrchestrator {
    pub fn new(ledger: Arc<dyn BookingLedger>) -> Self {
        Self {
            ledger,
            flights: RwLock::new(HashMap::new()),
            class_priority: RwLock::new(ClassPriority::default()),
            selector: Arc::new(BestSeatSelector),
            pricing: PricingEngine::default(),
        }
    }

    pub fn with_selector(mut self, selector: Arc<dyn SeatSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_pricing(mut self, pricing: PricingEngine) -> Self {
        self.pricing = pricing;
        self
    }

    /// Register a flight. Re-registering an existing id returns the flight
    /// already on file.
    pub fn register_flight(
        &self,
        flight_id: &str,
        origin: &str,
        destination: &str,
        aircraft: &str,
        departure: DateTime<Utc>,
        arrival: DateTime<Utc>,
    ) -> Arc<Flight> {
        let mut flights = self.flights.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = flights.get(flight_id) {
            warn!(flight_id, "Flight already registered, keeping original");
            return Arc::clone(existing);
        }

        let flight = Arc::new(Flight::new(flight_id, origin, destination, aircraft, departure, arrival));
        flights.insert(flight_id.to_string(), Arc::clone(&flight));
        info!(flight_id, origin, destination, %departure, "Flight registered");
        flight
    }

    /// Add a fare class to a flight. Returns `false` when the class already existed.
    pub fn add_fare_class(
        &self,
        flight: &Flight,
        fare_class: &str,
        layout: &[Vec<SeatSpec>],
        base_fare: f64,
    ) -> Result<bool, BookingError> {
        Ok(flight.add_fare_class(fare_class, layout, base_fare)?)
    }

    pub fn find_flight(&self, flight_id: &str) -> Option<Arc<Flight>> {
        self.flights
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(flight_id)
            .cloned()
    }

    /// Flights matching origin, destination and departure day exactly,
    /// earliest departure first
    pub fn search_flights(&self, query: &FlightQuery) -> Vec<Arc<Flight>> {
        let mut found: Vec<Arc<Flight>> = self
            .flights
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|flight| query.matches(flight.origin(), flight.destination(), flight.departure()))
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            a.departure()
                .cmp(&b.departure())
                .then_with(|| a.flight_id().cmp(b.flight_id()))
        });
        found
    }

    /// Replace the upgrade order. An empty list restores the fallback order.
    pub fn set_class_priority<I, S>(&self, classes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let priority = ClassPriority::new(classes);
        info!(classes = ?priority.classes(), "Class priority updated");
        *self.class_priority.write().unwrap_or_else(PoisonError::into_inner) = priority;
    }

    pub fn class_priority(&self) -> ClassPriority {
        self.class_priority
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn upgrade_target(&self, flight: &Flight, fare_class: &str) -> Option<String> {
        self.class_priority().upgrade_for(flight, fare_class)
    }

    /// Allocate the best seat in `fare_class`, or one tier above it when the
    /// requested class is exhausted, price it and record the booking.
    ///
    /// If the ledger write fails the error is returned as-is and the seat
    /// stays occupied.
    pub async fn book_seat(
        &self,
        passenger_id: &str,
        flight_id: &str,
        fare_class: &str,
        booked_at: DateTime<Utc>,
    ) -> Result<BookingRecord, BookingError> {
        let flight = self
            .find_flight(flight_id)
            .ok_or_else(|| BookingError::FlightNotFound(flight_id.to_string()))?;

        let loyalty_member = self.is_loyalty_member(passenger_id).await;

        let allocation = match self.allocate(&flight, fare_class) {
            Ok(allocation) => allocation,
            Err(InventoryError::NoSeatAvailable(_)) => {
                let upgrade = self
                    .upgrade_target(&flight, fare_class)
                    .ok_or_else(|| BookingError::no_seat(flight_id, fare_class))?;

                info!(flight_id, fare_class, upgrade = %upgrade, "Requested class full, trying one tier up");
                self.allocate(&flight, &upgrade)
                    .map_err(|_| BookingError::no_seat(flight_id, fare_class))?
            }
            Err(err) => return Err(err.into()),
        };

        let price = self.pricing.quote(
            allocation.base_fare,
            flight.departure(),
            booked_at,
            allocation.occupancy_ratio,
            loyalty_member,
        );

        let record = BookingRecord::new(
            passenger_id,
            flight_id,
            allocation.seat.seat_id.as_str(),
            allocation.fare_class.as_str(),
            booked_at,
            price,
        );

        if let Err(err) = self.ledger.save(&record).await {
            error!(
                booking_id = %record.booking_id,
                flight_id,
                fare_class = %record.fare_class,
                seat_id = %record.seat_id,
                error = %err,
                "Ledger write failed; seat remains occupied without a booking record"
            );
            return Err(err.into());
        }

        info!(
            booking_id = %record.booking_id,
            passenger_id,
            flight_id,
            requested = fare_class,
            fare_class = %record.fare_class,
            seat_id = %record.seat_id,
            price = record.price,
            loyalty_member,
            "Seat booked"
        );
        Ok(record)
    }

    /// Free the seat held by a booking. The booking record itself is kept.
    pub async fn cancel_booking(&self, booking_id: Uuid, now: DateTime<Utc>) -> Result<(), BookingError> {
        let record = self
            .ledger
            .get(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        let flight = self
            .find_flight(&record.flight_id)
            .ok_or_else(|| BookingError::FlightNotFound(record.flight_id.clone()))?;

        let released = Self::release(&flight, &record.fare_class, &record.seat_id);
        if released {
            info!(%booking_id, flight_id = %record.flight_id, seat_id = %record.seat_id, cancelled_at = %now, "Booking cancelled");
        } else {
            warn!(%booking_id, flight_id = %record.flight_id, seat_id = %record.seat_id, "Seat was already free");
        }
        Ok(())
    }

    pub async fn bookings_for_passenger(&self, passenger_id: &str) -> Result<Vec<BookingRecord>, BookingError> {
        Ok(self.ledger.list_by_passenger(passenger_id).await?)
    }

    pub async fn bookings_for_flight(&self, flight_id: &str) -> Result<Vec<BookingRecord>, BookingError> {
        Ok(self.ledger.list_by_flight(flight_id).await?)
    }

    async fn is_loyalty_member(&self, passenger_id: &str) -> bool {
        match self.ledger.list_by_passenger(passenger_id).await {
            Ok(history) => qualifies_for_loyalty(history.len()),
            Err(err) => {
                warn!(passenger_id, error = %err, "Booking history unavailable, pricing as non-member");
                false
            }
        }
    }

    /// One guarded allocation attempt. The guard never outlives this call.
    fn allocate(&self, flight: &Flight, fare_class: &str) -> Result<Allocation, InventoryError> {
        let partition = flight
            .partition(fare_class)
            .ok_or_else(|| InventoryError::NoSeatAvailable(fare_class.to_string()))?;

        let mut guard = partition.lock();
        let allocation = guard.allocate(self.selector.as_ref());
        drop(guard);
        allocation
    }

    fn release(flight: &Flight, fare_class: &str, seat_id: &str) -> bool {
        let Some(partition) = flight.partition(fare_class) else {
            return false;
        };

        let mut guard = partition.lock();
        let released = guard.release(seat_id);
        drop(guard);
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aisle_catalog::{CabinGeometry, FarePolicy, Seat};
    use aisle_store::InMemoryBookingLedger;
    use chrono::{Duration, NaiveDate, TimeZone};

    /// Fills the cabin from the last row backwards
    struct BackRowSelector;

    impl SeatSelector for BackRowSelector {
        fn select<'a>(&self, available: &[&'a Seat], _geometry: CabinGeometry) -> Option<&'a Seat> {
            available.iter().copied().max_by_key(|seat| (seat.row, seat.column))
        }
    }

    fn orchestrator() -> BookingOrchestrator {
        BookingOrchestrator::new(Arc::new(InMemoryBookingLedger::new()))
    }

    fn departure() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 14, 9, 15, 0).unwrap()
    }

    #[test]
    fn test_loyalty_threshold() {
        assert!(!qualifies_for_loyalty(0));
        assert!(!qualifies_for_loyalty(4));
        assert!(qualifies_for_loyalty(5));
        assert!(qualifies_for_loyalty(12));
    }

    #[test]
    fn test_register_and_find_flight() {
        let orchestrator = orchestrator();
        let flight = orchestrator.register_flight("SB100", "BKK", "JFK", "Boeing 777", departure(), departure() + Duration::hours(17));

        let found = orchestrator.find_flight("SB100").unwrap();
        assert!(Arc::ptr_eq(&flight, &found));
        assert!(orchestrator.find_flight("SB404").is_none());
    }

    #[test]
    fn test_register_twice_keeps_first() {
        let orchestrator = orchestrator();
        let first = orchestrator.register_flight("SB100", "BKK", "JFK", "Boeing 777", departure(), departure());
        let second = orchestrator.register_flight("SB100", "BKK", "LHR", "Airbus A380", departure(), departure());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.destination(), "JFK");
    }

    #[test]
    fn test_search_flights_exact_match() {
        let orchestrator = orchestrator();
        let later = departure() + Duration::hours(6);
        orchestrator.register_flight("SB102", "BKK", "NRT", "A350", later, later + Duration::hours(6));
        orchestrator.register_flight("SB101", "BKK", "NRT", "A350", departure(), departure() + Duration::hours(6));
        orchestrator.register_flight("SB103", "BKK", "NRT", "A350", departure() + Duration::days(1), departure());
        orchestrator.register_flight("SB104", "BKK", "KIX", "A350", departure(), departure());

        let query = FlightQuery::new("BKK", "NRT", NaiveDate::from_ymd_opt(2026, 8, 14).unwrap());
        let ids: Vec<String> = orchestrator
            .search_flights(&query)
            .iter()
            .map(|flight| flight.flight_id().to_string())
            .collect();

        assert_eq!(ids, vec!["SB101", "SB102"]);
    }

    #[test]
    fn test_set_class_priority() {
        let orchestrator = orchestrator();
        assert!(!orchestrator.class_priority().is_configured());

        orchestrator.set_class_priority(["Economy", "Business"]);
        assert_eq!(orchestrator.class_priority().classes().to_vec(), vec!["Economy", "Business"]);

        orchestrator.set_class_priority(Vec::<String>::new());
        assert!(!orchestrator.class_priority().is_configured());
    }

    #[test]
    fn test_add_fare_class_surfaces_layout_errors() {
        let orchestrator = orchestrator();
        let flight = orchestrator.register_flight("SB100", "BKK", "JFK", "Boeing 777", departure(), departure());

        let result = orchestrator.add_fare_class(&flight, "Economy", &[], 1000.0);
        assert!(matches!(result, Err(BookingError::Inventory(InventoryError::InvalidLayout(_)))));

        let layout = vec![vec![SeatSpec::open(); 2]];
        assert!(orchestrator.add_fare_class(&flight, "Economy", &layout, 1000.0).unwrap());
        assert!(!orchestrator.add_fare_class(&flight, "Economy", &layout, 1200.0).unwrap());
    }

    #[tokio::test]
    async fn test_unknown_class_without_upgrade_is_no_seat() {
        let orchestrator = orchestrator();
        let flight = orchestrator.register_flight("SB100", "BKK", "JFK", "Boeing 777", departure(), departure());
        orchestrator
            .add_fare_class(&flight, "Economy", &[vec![SeatSpec::open()]], 1000.0)
            .unwrap();

        let result = orchestrator.book_seat("P1", "SB100", "Galley", departure() - Duration::days(3)).await;
        assert!(matches!(
            result,
            Err(BookingError::NoSeatAvailable { ref fare_class, .. }) if fare_class == "Galley"
        ));
    }

    #[tokio::test]
    async fn test_custom_selector_is_used() {
        let orchestrator = orchestrator().with_selector(Arc::new(BackRowSelector));
        let flight = orchestrator.register_flight("SB100", "BKK", "JFK", "Boeing 777", departure(), departure());
        orchestrator
            .add_fare_class(&flight, "Economy", &vec![vec![SeatSpec::open(); 3]; 4], 1000.0)
            .unwrap();

        let first = orchestrator.book_seat("P1", "SB100", "Economy", departure() - Duration::days(15)).await.unwrap();
        let second = orchestrator.book_seat("P2", "SB100", "Economy", departure() - Duration::days(15)).await.unwrap();

        assert_eq!(first.seat_id, "C4");
        assert_eq!(second.seat_id, "B4");
    }

    #[tokio::test]
    async fn test_custom_fare_policy_is_used() {
        let pricing = PricingEngine::new(FarePolicy {
            last_minute_multiplier: 2.0,
            ..FarePolicy::default()
        });
        let orchestrator = orchestrator().with_pricing(pricing);
        let flight = orchestrator.register_flight("SB100", "BKK", "JFK", "Boeing 777", departure(), departure());
        orchestrator
            .add_fare_class(&flight, "Economy", &[vec![SeatSpec::open(); 2]], 1000.0)
            .unwrap();

        let record = orchestrator.book_seat("P1", "SB100", "Economy", departure() - Duration::days(3)).await.unwrap();

        // 1000 * 2.0 * (1 + 1/2)
        assert!((record.price - 3000.0).abs() < 1e-9, "got {}", record.price);
    }
}
