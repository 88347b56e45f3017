mod slot_dto;

pub use slot_dto::*;
