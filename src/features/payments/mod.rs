//! Payments provider webhook.
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/payments/webhook` | Signature | Payment and refund events |
//!
//! Handled event types: `payment.succeeded`, `payment.failed`,
//! `refund.succeeded`. Others are acknowledged and ignored.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::PaymentWebhookService;
