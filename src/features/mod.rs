pub mod admin;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod jobs;
pub mod notifications;
pub mod payments;
pub mod profiles;
pub mod ratings;
pub mod slots;
