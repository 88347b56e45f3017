//! SMS notifications.
//!
//! Booking lifecycle messages are rendered from templates and sent to the
//! client when their preferences allow it. Every attempt, including skipped
//! ones, lands in the `notifications` table.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/notifications` | Any | Own notification history |
//! | POST | `/api/notifications/send` | Admin | Send a template or free-text SMS |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::NotificationService;
