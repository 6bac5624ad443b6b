pub mod booking;
pub mod layout;
