mod webhook_dto;

pub use webhook_dto::*;
