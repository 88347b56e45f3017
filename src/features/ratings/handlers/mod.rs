mod rating_handler;

pub use rating_handler::*;
