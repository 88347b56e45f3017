mod slot_handler;

pub use slot_handler::*;
