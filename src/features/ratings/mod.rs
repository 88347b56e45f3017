//! Ratings of finished jobs, one per side per job assignment.
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/requests/{id}/rate` | Client | Rate the agent |
//! | POST | `/api/agent/jobs/{id}/rate` | Agent | Rate the client |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::RatingService;
