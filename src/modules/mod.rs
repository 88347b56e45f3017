//! Modules layer - adapters for the vendor services the marketplace talks to
//!
//! Object storage for proof-of-work photos, SMS delivery and card payments.

pub mod payments;
pub mod sms;
pub mod storage;
