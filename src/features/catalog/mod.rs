//! Service catalog and agent suggestions.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/services` | Public | Active services |
//! | GET | `/api/services/{slug}` | Public | Service detail |
//! | GET/POST | `/api/agent/suggestions` | Agent | Own suggestions / propose a service |
//! | GET/POST | `/api/admin/services` | Admin | All services / create |
//! | PUT/DELETE | `/api/admin/services/{id}` | Admin | Update / deactivate |
//! | GET | `/api/admin/suggestions` | Admin | Review queue |
//! | POST | `/api/admin/suggestions/{id}/approve` | Admin | Publish to catalog |
//! | POST | `/api/admin/suggestions/{id}/reject` | Admin | Reject |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CatalogService;
