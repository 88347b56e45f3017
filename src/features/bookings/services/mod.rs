mod booking_service;
pub mod payment_state;
pub mod transitions;

pub use booking_service::{BookingService, CancelledBy};
