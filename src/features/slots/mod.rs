//! Calendar slots clients can book into.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/slots?from&to` | Public | Slots in a date window |
//! | POST | `/api/admin/slots` | Admin | Create slot |
//! | DELETE | `/api/admin/slots/{id}` | Admin | Delete an unbooked slot |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::SlotService;
