//! SMS delivery
//!
//! `SmsSender` is the seam the notification service talks to. The REST client
//! speaks the Twilio-style Messages API; the log sender stands in when SMS is
//! disabled so local environments never text real phones.

mod client;

pub use client::{build_sender, LogSmsSender, SmsClient, SmsError, SmsReceipt, SmsSender};
