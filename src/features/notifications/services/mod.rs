mod notification_service;

pub use notification_service::{delivery_target, NotificationService, SkipReason};
