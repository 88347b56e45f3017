mod reminder_processor;

pub use reminder_processor::ReminderProcessor;
