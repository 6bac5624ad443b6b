use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use aisle_shared::{FareClassSummary, SeatSpec};
use crate::seat::Seat;
use crate::selector::{CabinGeometry, SeatSelector};

/// Seat inventory for one fare class of one flight.
///
/// Every read or write of seat occupancy goes through [`SeatPartition::lock`].
/// The guard belongs to this partition alone, so contention in one cabin never
/// stalls another.
#[derive(Debug)]
pub struct SeatPartition {
    fare_class: String,
    geometry: CabinGeometry,
    base_fare: f64,
    total_seats: usize,
    seats: Mutex<Vec<Seat>>,
}

/// Outcome of a successful allocation, detached from the guard
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub fare_class: String,
    pub seat: Seat,
    pub base_fare: f64,
    /// Occupied / total (special seats included), measured right after this allocation
    pub occupancy_ratio: f64,
}

impl SeatPartition {
    /// Build a partition from a row-major layout grid
    pub fn from_layout(
        fare_class: impl Into<String>,
        layout: &[Vec<SeatSpec>],
        base_fare: f64,
    ) -> Result<Self, InventoryError> {
        let fare_class = fare_class.into();
        let columns = layout.first().map(Vec::len).unwrap_or(0);

        if columns == 0 {
            return Err(InventoryError::InvalidLayout(format!(
                "fare class {} has an empty seat layout",
                fare_class
            )));
        }

        if let Some((index, row)) = layout.iter().enumerate().find(|(_, row)| row.len() != columns) {
            return Err(InventoryError::InvalidLayout(format!(
                "row {} of fare class {} has {} seats, expected {}",
                index + 1,
                fare_class,
                row.len(),
                columns
            )));
        }

        let seats: Vec<Seat> = layout
            .iter()
            .enumerate()
            .flat_map(|(row, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(move |(column, spec)| Seat::new(row + 1, column + 1, spec.special.clone()))
            })
            .collect();

        Ok(Self {
            fare_class,
            geometry: CabinGeometry { rows: layout.len(), columns },
            base_fare,
            total_seats: seats.len(),
            seats: Mutex::new(seats),
        })
    }

    pub fn fare_class(&self) -> &str {
        &self.fare_class
    }

    pub fn geometry(&self) -> CabinGeometry {
        self.geometry
    }

    pub fn base_fare(&self) -> f64 {
        self.base_fare
    }

    pub fn total_seats(&self) -> usize {
        self.total_seats
    }

    /// Block until this partition's guard is free.
    ///
    /// Seat mutations are single-field writes, so a guard poisoned by a
    /// panicking holder still protects a consistent seat set and is recovered.
    pub fn lock(&self) -> PartitionGuard<'_> {
        PartitionGuard {
            partition: self,
            seats: self.seats.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Acquire the guard only if nobody holds it
    pub fn try_lock(&self) -> Option<PartitionGuard<'_>> {
        let seats = match self.seats.try_lock() {
            Ok(seats) => seats,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };
        Some(PartitionGuard { partition: self, seats })
    }

    pub fn summary(&self) -> FareClassSummary {
        let available = self.lock().available_seats().len();
        FareClassSummary {
            fare_class: self.fare_class.clone(),
            total: self.total_seats,
            available,
            base_fare: self.base_fare,
        }
    }
}

/// Exclusive access to one partition's seats. Dropping it releases the guard.
pub struct PartitionGuard<'a> {
    partition: &'a SeatPartition,
    seats: MutexGuard<'a, Vec<Seat>>,
}

impl PartitionGuard<'_> {
    /// Seats that are neither occupied nor marked special
    pub fn available_seats(&self) -> Vec<&Seat> {
        self.seats.iter().filter(|seat| seat.is_bookable()).collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.occupied).count()
    }

    pub fn occupancy_ratio(&self) -> f64 {
        self.occupied_count() as f64 / self.partition.total_seats as f64
    }

    /// Mark the selector's pick occupied and report post-allocation occupancy
    pub fn allocate(&mut self, selector: &dyn SeatSelector) -> Result<Allocation, InventoryError> {
        let partition = self.partition;
        let no_seat = || InventoryError::NoSeatAvailable(partition.fare_class.clone());

        let picked = {
            let available = self.available_seats();
            selector
                .select(&available, partition.geometry)
                .map(|seat| seat.seat_id.clone())
        };
        let index = picked
            .and_then(|id| self.seats.iter().position(|seat| seat.seat_id == id && seat.is_bookable()))
            .ok_or_else(no_seat)?;

        self.seats[index].occupied = true;
        let seat = self.seats[index].clone();

        Ok(Allocation {
            fare_class: partition.fare_class.clone(),
            seat,
            base_fare: partition.base_fare,
            occupancy_ratio: self.occupancy_ratio(),
        })
    }

    /// Free a seat. Unknown or already-free seats are a no-op.
    ///
    /// Returns whether the seat was occupied before the call.
    pub fn release(&mut self, seat_id: &str) -> bool {
        match self.seats.iter_mut().find(|seat| seat.seat_id == seat_id) {
            Some(seat) => std::mem::replace(&mut seat.occupied, false),
            None => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("No seat available in fare class {0}")]
    NoSeatAvailable(String),

    #[error("Invalid seat layout: {0}")]
    InvalidLayout(String),
}
