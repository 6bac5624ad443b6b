pub mod error;
pub mod priority;
pub mod orchestrator;
pub mod finance;

pub use error::BookingError;
pub use priority::ClassPriority;
pub use orchestrator::{qualifies_for_loyalty, BookingOrchestrator, LOYALTY_THRESHOLD};
pub use finance::{refund_amount, REFUND_RATE};
