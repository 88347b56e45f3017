use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use futures::stream::{self, StreamExt};
use minijinja::{context, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::dtos::*;
use crate::features::notifications::models::*;
use crate::features::profiles::models::NotificationPreferences;
use crate::features::profiles::ProfileService;
use crate::modules::sms::SmsSender;
use crate::shared::money::Money;
use crate::shared::templates::{render_template, template_exists};

/// Recipients handled at once by an admin broadcast
const BROADCAST_CONCURRENCY: usize = 8;

const NOTIFICATION_COLUMNS: &str = "id, user_id, request_id, channel, template, recipient, body, \
     status, provider_message_id, error_message, created_at";

/// Why a message was not handed to the vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ChannelDisabled,
    CategoryDisabled,
    NoRecipient,
    ChannelUnavailable,
}

impl SkipReason {
    pub fn message(self) -> &'static str {
        match self {
            SkipReason::ChannelDisabled => "Channel disabled in notification preferences",
            SkipReason::CategoryDisabled => "Category disabled in notification preferences",
            SkipReason::NoRecipient => "No phone number on profile",
            SkipReason::ChannelUnavailable => "Push delivery is not available",
        }
    }
}

/// Decide whether a message may go out, returning the recipient address
pub fn delivery_target<'a>(
    prefs: &NotificationPreferences,
    channel: NotificationChannel,
    category: NotificationCategory,
    phone: Option<&'a str>,
) -> std::result::Result<&'a str, SkipReason> {
    let channel_on = match channel {
        NotificationChannel::Sms => prefs.sms_enabled,
        NotificationChannel::Push => prefs.push_enabled,
    };
    if !channel_on {
        return Err(SkipReason::ChannelDisabled);
    }

    let category_on = match category {
        NotificationCategory::BookingUpdates => prefs.booking_updates,
        NotificationCategory::Reminders => prefs.reminders,
        NotificationCategory::Direct => true,
    };
    if !category_on {
        return Err(SkipReason::CategoryDisabled);
    }

    if channel == NotificationChannel::Push {
        return Err(SkipReason::ChannelUnavailable);
    }

    phone
        .filter(|p| !p.trim().is_empty())
        .ok_or(SkipReason::NoRecipient)
}

/// Context fragment for cancellation messages; zero amounts are left out
pub fn cancellation_context(currency: &str, fee: Money, refund: Money) -> Value {
    context! {
        fee => (!fee.is_zero()).then(|| fee.format_in(currency)),
        refund => (!refund.is_zero()).then(|| refund.format_in(currency)),
    }
}

/// Fold one recipient's outcome into the broadcast summary.
///
/// An attempt that could not be logged counts as failed so the rest of the
/// broadcast still reports.
fn tally(result: &mut SendNotificationResultDto, user_id: &str, outcome: Result<Notification>) {
    match outcome {
        Ok(notification) => {
            match notification.status {
                NotificationStatus::Sent => result.sent += 1,
                NotificationStatus::Failed => result.failed += 1,
                NotificationStatus::Skipped => result.skipped += 1,
            }
            result.notifications.push(notification.into());
        }
        Err(e) => {
            tracing::error!("Broadcast to user {} was not recorded: {}", user_id, e);
            result.failed += 1;
        }
    }
}

/// Sends SMS notifications and keeps the delivery log
pub struct NotificationService {
    pool: PgPool,
    sms: Arc<dyn SmsSender>,
    profiles: Arc<ProfileService>,
    service_area_offset: FixedOffset,
    currency: String,
}

impl NotificationService {
    pub fn new(
        pool: PgPool,
        sms: Arc<dyn SmsSender>,
        profiles: Arc<ProfileService>,
        service_area_offset: FixedOffset,
        currency: String,
    ) -> Self {
        Self {
            pool,
            sms,
            profiles,
            service_area_offset,
            currency,
        }
    }

    /// Appointment time as shown to users, in the service area's local time
    pub fn format_local(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.service_area_offset)
            .format("%a %d %b %Y, %H:%M")
            .to_string()
    }

    /// Notify the client of a booking event. Failures are logged, never returned.
    pub async fn notify_booking(&self, notice: &BookingNotice, kind: NotificationKind, extra: Value) {
        let ctx = context! {
            reference_number => &notice.reference_number,
            service_name => &notice.service_name,
            scheduled_at => self.format_local(notice.scheduled_at),
            ..extra
        };

        let body = match render_template(kind.template(), ctx) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(
                    "Failed to render {} for booking {}: {}",
                    kind.template(),
                    notice.reference_number,
                    e
                );
                return;
            }
        };

        if let Err(e) = self
            .deliver(
                &notice.client_id,
                Some(notice.request_id),
                NotificationChannel::Sms,
                kind.category(),
                kind.template(),
                body,
            )
            .await
        {
            tracing::error!(
                "Failed to record {} notification for booking {}: {}",
                kind.template(),
                notice.reference_number,
                e
            );
        }
    }

    /// Context fragment for cancellation messages
    pub fn cancellation_context(&self, fee: Money, refund: Money) -> Value {
        cancellation_context(&self.currency, fee, refund)
    }

    /// Admin broadcast to several users at once
    pub async fn send(&self, dto: SendNotificationDto) -> Result<SendNotificationResultDto> {
        let (template, body) = match (&dto.template, &dto.message) {
            (Some(name), _) => {
                if !template_exists(name) {
                    return Err(AppError::BadRequest(format!("Unknown template '{}'", name)));
                }
                let body = render_template(name, &dto.context)
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                (name.clone(), body)
            }
            (None, Some(message)) => ("direct".to_string(), message.trim().to_string()),
            (None, None) => {
                return Err(AppError::Validation(
                    "A template or a message is required".to_string(),
                ))
            }
        };

        let mut user_ids = dto.user_ids.clone();
        user_ids.sort();
        user_ids.dedup();

        let mut result = SendNotificationResultDto {
            sent: 0,
            failed: 0,
            skipped: 0,
            notifications: Vec::with_capacity(user_ids.len()),
        };

        let (template, body) = (&template, &body);
        let (request_id, channel) = (dto.request_id, dto.channel);
        let mut outcomes = stream::iter(user_ids.iter().cloned())
            .map(|user_id: String| async move {
                let outcome = self
                    .deliver(
                        &user_id,
                        request_id,
                        channel,
                        NotificationCategory::Direct,
                        template,
                        body.clone(),
                    )
                    .await;
                (user_id, outcome)
            })
            .buffer_unordered(BROADCAST_CONCURRENCY);

        while let Some((user_id, outcome)) = outcomes.next().await {
            tally(&mut result, &user_id, outcome);
        }

        tracing::info!(
            "Broadcast '{}' finished: sent={}, failed={}, skipped={}",
            template,
            result.sent,
            result.failed,
            result.skipped
        );

        Ok(result)
    }

    /// Check preferences, hand the message to the vendor and log the attempt
    async fn deliver(
        &self,
        user_id: &str,
        request_id: Option<Uuid>,
        channel: NotificationChannel,
        category: NotificationCategory,
        template: &str,
        body: String,
    ) -> Result<Notification> {
        let prefs = self.profiles.preferences_for(user_id).await?;
        let profile = self.profiles.find_profile(user_id).await?;
        let phone = profile.as_ref().and_then(|p| p.phone.as_deref());

        let mut entry = NewNotification {
            user_id: user_id.to_string(),
            request_id,
            channel,
            template: template.to_string(),
            recipient: phone.map(str::to_string),
            body,
            status: NotificationStatus::Skipped,
            provider_message_id: None,
            error_message: None,
        };

        match delivery_target(&prefs, channel, category, phone) {
            Ok(to) => match self.sms.send(to, &entry.body).await {
                Ok(receipt) => {
                    entry.status = NotificationStatus::Sent;
                    entry.provider_message_id = Some(receipt.message_id);
                }
                Err(e) => {
                    tracing::warn!("SMS to user {} failed: {}", user_id, e);
                    entry.status = NotificationStatus::Failed;
                    entry.error_message = Some(e.to_string());
                }
            },
            Err(reason) => {
                tracing::debug!("Notification to user {} skipped: {:?}", user_id, reason);
                entry.error_message = Some(reason.message().to_string());
            }
        }

        self.record(entry).await
    }

    async fn record(&self, entry: NewNotification) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications
                (user_id, request_id, channel, template, recipient, body, status,
                 provider_message_id, error_message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(&entry.user_id)
        .bind(entry.request_id)
        .bind(entry.channel)
        .bind(&entry.template)
        .bind(&entry.recipient)
        .bind(&entry.body)
        .bind(entry.status)
        .bind(&entry.provider_message_id)
        .bind(&entry.error_message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to log notification: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(notification)
    }

    pub async fn list_for_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<NotificationResponseDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1 \
             ORDER BY created_at DESC OFFSET $2 LIMIT $3"
        ))
        .bind(user_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> NotificationPreferences {
        NotificationPreferences::defaults_for("client-1")
    }

    const PHONE: Option<&str> = Some("+14155550123");

    #[test]
    fn test_defaults_allow_booking_updates() {
        assert_eq!(
            delivery_target(
                &prefs(),
                NotificationChannel::Sms,
                NotificationCategory::BookingUpdates,
                PHONE
            ),
            Ok("+14155550123")
        );
    }

    #[test]
    fn test_sms_switch_blocks_everything() {
        let mut prefs = prefs();
        prefs.sms_enabled = false;

        for category in [
            NotificationCategory::BookingUpdates,
            NotificationCategory::Reminders,
            NotificationCategory::Direct,
        ] {
            assert_eq!(
                delivery_target(&prefs, NotificationChannel::Sms, category, PHONE),
                Err(SkipReason::ChannelDisabled)
            );
        }
    }

    #[test]
    fn test_reminder_switch_only_blocks_reminders() {
        let mut prefs = prefs();
        prefs.reminders = false;

        assert_eq!(
            delivery_target(
                &prefs,
                NotificationChannel::Sms,
                NotificationCategory::Reminders,
                PHONE
            ),
            Err(SkipReason::CategoryDisabled)
        );
        assert!(delivery_target(
            &prefs,
            NotificationChannel::Sms,
            NotificationCategory::BookingUpdates,
            PHONE
        )
        .is_ok());
    }

    #[test]
    fn test_missing_phone_is_skipped() {
        for phone in [None, Some(""), Some("  ")] {
            assert_eq!(
                delivery_target(
                    &prefs(),
                    NotificationChannel::Sms,
                    NotificationCategory::Direct,
                    phone
                ),
                Err(SkipReason::NoRecipient)
            );
        }
    }

    #[test]
    fn test_push_is_logged_not_sent() {
        assert_eq!(
            delivery_target(
                &prefs(),
                NotificationChannel::Push,
                NotificationCategory::BookingUpdates,
                PHONE
            ),
            Err(SkipReason::ChannelUnavailable)
        );
    }

    #[test]
    fn test_cancellation_context_hides_zero_amounts() {
        let ctx = cancellation_context("usd", Money::ZERO, Money::from_cents(5000));
        let body = render_template(
            "booking_cancelled",
            context! { reference_number => "BK-2026-0000007", ..ctx },
        )
        .unwrap();

        assert!(!body.contains("Cancellation fee"));
        assert!(body.contains("Refund: $50.00"));
    }

    #[test]
    fn test_cancellation_context_uses_currency_symbol() {
        let ctx = cancellation_context("usd", Money::from_cents(2000), Money::from_cents(3000));
        let body = render_template(
            "booking_cancelled",
            context! { reference_number => "BK-2026-0000008", ..ctx },
        )
        .unwrap();

        assert!(body.contains("Cancellation fee: $20.00."));
        assert!(body.contains("Refund: $30.00."));
    }

    fn logged(status: NotificationStatus) -> Result<Notification> {
        Ok(Notification {
            id: Uuid::new_v4(),
            user_id: "client-1".to_string(),
            request_id: None,
            channel: NotificationChannel::Sms,
            template: "direct".to_string(),
            recipient: PHONE.map(str::to_string),
            body: "ServiceHub: hello".to_string(),
            status,
            provider_message_id: None,
            error_message: None,
            created_at: Utc::now(),
        })
    }

    #[test]
    fn test_tally_counts_unrecorded_attempt_as_failed() {
        let mut result = SendNotificationResultDto {
            sent: 0,
            failed: 0,
            skipped: 0,
            notifications: Vec::new(),
        };

        tally(&mut result, "client-1", logged(NotificationStatus::Sent));
        tally(
            &mut result,
            "client-2",
            Err(AppError::Database(sqlx::Error::PoolTimedOut)),
        );
        tally(&mut result, "client-3", logged(NotificationStatus::Skipped));
        tally(&mut result, "client-4", logged(NotificationStatus::Failed));

        assert_eq!(result.sent, 1);
        assert_eq!(result.failed, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.notifications.len(), 3);
    }

    #[test]
    fn test_kind_categories() {
        assert_eq!(
            NotificationKind::BookingReminder.category(),
            NotificationCategory::Reminders
        );
        assert_eq!(
            NotificationKind::BookingCancelled.category(),
            NotificationCategory::BookingUpdates
        );
        for kind in [
            NotificationKind::BookingConfirmed,
            NotificationKind::AgentAssigned,
            NotificationKind::JobStarted,
            NotificationKind::AwaitingVerification,
            NotificationKind::JobCompleted,
            NotificationKind::BookingCancelled,
            NotificationKind::BookingReminder,
        ] {
            assert!(template_exists(kind.template()));
        }
    }
}
