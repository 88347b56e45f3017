//! Client bookings.
//!
//! A booking moves through the lifecycle in [`policies::lifecycle`]; every
//! status change goes through [`services::transitions::apply`] and leaves a
//! row in `booking_events`. Cancellation fees follow
//! [`policies::cancellation`].
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET/POST | `/api/requests` | Client | List / create bookings |
//! | GET | `/api/requests/{id}` | Client | Booking detail with allowed actions |
//! | GET | `/api/requests/{id}/cancellation-quote` | Client | Fee and refund if cancelled now |
//! | POST | `/api/requests/{id}/cancel` | Client | Cancel |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod policies;
pub mod routes;
pub mod services;
pub mod workers;

pub use services::{BookingService, CancelledBy};
pub use workers::ReminderProcessor;
