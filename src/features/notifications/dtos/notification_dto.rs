use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::notifications::models::{
    Notification, NotificationChannel, NotificationStatus,
};

/// Response DTO for a notification log entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponseDto {
    pub id: Uuid,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
    pub channel: NotificationChannel,
    pub template: String,
    pub body: String,
    pub status: NotificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponseDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            request_id: n.request_id,
            channel: n.channel,
            template: n.template,
            body: n.body,
            status: n.status,
            error_message: n.error_message,
            created_at: n.created_at,
        }
    }
}

/// Request DTO for an admin broadcast
///
/// Either `template` (rendered with `context`) or a free-text `message` is required.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_send_body"))]
pub struct SendNotificationDto {
    #[validate(length(min = 1, max = 500, message = "Between 1 and 500 recipients"))]
    pub user_ids: Vec<String>,

    #[serde(default = "default_channel")]
    pub channel: NotificationChannel,

    pub template: Option<String>,

    #[validate(length(min = 1, max = 1600, message = "Message must be 1-1600 characters"))]
    pub message: Option<String>,

    /// Variables for the template
    #[serde(default)]
    #[schema(value_type = Object)]
    pub context: serde_json::Value,

    pub request_id: Option<Uuid>,
}

fn default_channel() -> NotificationChannel {
    NotificationChannel::Sms
}

fn validate_send_body(dto: &SendNotificationDto) -> Result<(), ValidationError> {
    match (&dto.template, &dto.message) {
        (Some(_), Some(_)) => Err(ValidationError::new("template_or_message")
            .with_message("Provide either a template or a message, not both".into())),
        (None, None) => Err(ValidationError::new("template_or_message")
            .with_message("A template or a message is required".into())),
        _ => Ok(()),
    }
}

/// Per-recipient outcome of a broadcast
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResultDto {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    pub notifications: Vec<NotificationResponseDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(template: Option<&str>, message: Option<&str>) -> SendNotificationDto {
        SendNotificationDto {
            user_ids: vec!["client-1".to_string()],
            channel: NotificationChannel::Sms,
            template: template.map(str::to_string),
            message: message.map(str::to_string),
            context: serde_json::Value::Null,
            request_id: None,
        }
    }

    #[test]
    fn test_template_or_message_required() {
        assert!(dto(None, None).validate().is_err());
        assert!(dto(Some("booking_reminder"), Some("hi")).validate().is_err());
        assert!(dto(Some("booking_reminder"), None).validate().is_ok());
        assert!(dto(None, Some("Service window changed")).validate().is_ok());
    }

    #[test]
    fn test_recipients_required() {
        let mut empty = dto(None, Some("hi"));
        empty.user_ids.clear();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_channel_defaults_to_sms() {
        let dto: SendNotificationDto = serde_json::from_value(serde_json::json!({
            "userIds": ["a"],
            "message": "hello"
        }))
        .unwrap();
        assert_eq!(dto.channel, NotificationChannel::Sms);
    }
}
