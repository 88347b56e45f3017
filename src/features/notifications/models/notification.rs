use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "notification_channel", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Sms,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "notification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Sent,
    Failed,
    Skipped,
}

/// Which preference switch governs a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    BookingUpdates,
    Reminders,
    /// Sent by an admin; only the channel switch applies
    Direct,
}

/// Lifecycle messages sent to clients, one template each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    BookingConfirmed,
    AgentAssigned,
    JobStarted,
    AwaitingVerification,
    JobCompleted,
    BookingCancelled,
    BookingReminder,
}

impl NotificationKind {
    pub fn template(self) -> &'static str {
        match self {
            NotificationKind::BookingConfirmed => "booking_confirmed",
            NotificationKind::AgentAssigned => "agent_assigned",
            NotificationKind::JobStarted => "job_started",
            NotificationKind::AwaitingVerification => "awaiting_verification",
            NotificationKind::JobCompleted => "job_completed",
            NotificationKind::BookingCancelled => "booking_cancelled",
            NotificationKind::BookingReminder => "booking_reminder",
        }
    }

    pub fn category(self) -> NotificationCategory {
        match self {
            NotificationKind::BookingReminder => NotificationCategory::Reminders,
            _ => NotificationCategory::BookingUpdates,
        }
    }
}

/// Database model for notification log entry
#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub request_id: Option<Uuid>,
    pub channel: NotificationChannel,
    pub template: String,
    pub recipient: Option<String>,
    pub body: String,
    pub status: NotificationStatus,
    pub provider_message_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for logging a delivery attempt
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub request_id: Option<Uuid>,
    pub channel: NotificationChannel,
    pub template: String,
    pub recipient: Option<String>,
    pub body: String,
    pub status: NotificationStatus,
    pub provider_message_id: Option<String>,
    pub error_message: Option<String>,
}

/// Facts about a booking that lifecycle messages are rendered from
#[derive(Debug, Clone)]
pub struct BookingNotice {
    pub client_id: String,
    pub request_id: Uuid,
    pub reference_number: String,
    pub service_name: String,
    pub scheduled_at: DateTime<Utc>,
}
