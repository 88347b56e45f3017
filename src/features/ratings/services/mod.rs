mod rating_service;

pub use rating_service::{ensure_not_rated, RatingService};
