//! User profiles feature.
//!
//! Profiles are keyed by the auth subject and created from token claims the
//! first time a user touches any profile endpoint.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET/PUT | `/api/profile/me` | Any | Own profile |
//! | GET/PUT | `/api/profile/agent` | Agent | Own agent profile |
//! | GET/POST | `/api/profile/addresses` | Any | List / create addresses |
//! | PUT/DELETE | `/api/profile/addresses/{id}` | Any | Update / delete address |
//! | GET/PUT | `/api/profile/notification-preferences` | Any | Notification switches |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ProfileService;
