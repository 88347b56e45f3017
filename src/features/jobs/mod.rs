//! Agent side of the job lifecycle.
//!
//! Jobs are addressed by booking id. Every endpoint re-reads the caller's
//! agent profile, so a deactivated agent is locked out even with a valid token.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/agent/jobs/available` | Agent | Open bookings |
//! | GET | `/api/agent/jobs` | Agent | Own jobs |
//! | GET | `/api/agent/jobs/{id}` | Agent | Job detail |
//! | POST | `/api/agent/requests/{id}/accept` | Agent | Accept a booking |
//! | POST | `/api/agent/jobs/{id}/checkin` | Agent | Start work |
//! | POST | `/api/agent/jobs/{id}/proof` | Agent | Upload before/after photo |
//! | POST | `/api/agent/jobs/{id}/checkout` | Agent | Finish work |
//! | POST | `/api/agent/jobs/{id}/cancel` | Agent | Withdraw |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::JobService;
