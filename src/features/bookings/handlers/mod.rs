mod booking_handler;

pub use booking_handler::*;
