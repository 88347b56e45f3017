//! Admin console.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/admin/bookings` | All bookings |
//! | GET | `/api/admin/bookings/{id}` | Booking detail |
//! | POST | `/api/admin/bookings/{id}/confirm` | Confirm |
//! | POST | `/api/admin/bookings/{id}/assign` | Assign an agent |
//! | POST | `/api/admin/bookings/{id}/verify` | Accept proof photos |
//! | POST | `/api/admin/bookings/{id}/reject-proof` | Send back to the agent |
//! | POST | `/api/admin/bookings/{id}/charge` | Charge the card on file |
//! | POST | `/api/admin/bookings/{id}/complete` | Close the booking |
//! | POST | `/api/admin/bookings/{id}/cancel` | Cancel without a fee |
//! | GET | `/api/admin/agents` | Agents |
//! | PUT | `/api/admin/agents/{id}/tier` | Set tier |
//! | PUT | `/api/admin/agents/{id}/active` | Activate or deactivate |
//! | GET | `/api/admin/stats` | Dashboard numbers |
//!
//! Catalog, suggestion and slot moderation live with their features.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::AdminService;
