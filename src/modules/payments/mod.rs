//! Payments vendor adapter
//!
//! Off-session charges against a stored card and refunds, plus verification
//! of webhook signatures. The REST client speaks a Stripe-style API.

mod client;
mod signature;

pub use client::{
    ChargeRequest, PaymentClient, PaymentError, PaymentGateway, PaymentOutcome, RefundRequest,
};
pub use signature::{sign_payload, verify_signature};
