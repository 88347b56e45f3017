mod slot_service;

pub use slot_service::{release_slot, reserve_slot, SlotService};
