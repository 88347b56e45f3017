pub mod cancellation;
pub mod lifecycle;

pub use cancellation::{cancellation_fee, quote, refund_amount, waived_quote, CancellationQuote};
pub use lifecycle::{allowed_actions, transition, BookingAction, BookingStatus, JobProgress};
