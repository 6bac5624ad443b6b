pub mod seat;
pub mod selector;
pub mod inventory;
pub mod pricing;
pub mod flight;

pub use seat::Seat;
pub use selector::{best_seat, BestSeatSelector, CabinGeometry, SeatSelector};
pub use inventory::{Allocation, InventoryError, PartitionGuard, SeatPartition};
pub use pricing::{FarePolicy, PricingEngine};
pub use flight::Flight;
