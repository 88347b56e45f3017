use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use uuid::Uuid;

use crate::core::config::BookingConfig;
use crate::core::error::Result;
use crate::features::bookings::models::{ServiceRequest, REQUEST_SELECT};
use crate::features::notifications::models::NotificationKind;
use crate::features::notifications::NotificationService;

/// Bookings claimed per tick
const BATCH_SIZE: i64 = 50;

/// Sends one reminder per upcoming confirmed or assigned booking
pub struct ReminderProcessor {
    pool: PgPool,
    notifications: Arc<NotificationService>,
    lead_hours: i64,
    interval_secs: u64,
}

impl ReminderProcessor {
    pub fn new(pool: PgPool, notifications: Arc<NotificationService>, config: &BookingConfig) -> Self {
        Self {
            pool,
            notifications,
            lead_hours: config.reminder_lead_hours,
            interval_secs: config.reminder_interval_secs,
        }
    }

    /// Run the processor in a background loop
    pub async fn run(&self) {
        tracing::info!(
            "Starting booking reminder worker (lead={}h, every {}s)",
            self.lead_hours,
            self.interval_secs
        );

        let mut interval = interval(Duration::from_secs(self.interval_secs.max(1)));

        loop {
            interval.tick().await;

            if let Err(e) = self.process_batch().await {
                tracing::error!("Error sending booking reminders: {:?}", e);
            }
        }
    }

    async fn process_batch(&self) -> Result<()> {
        let claimed = self.claim_due().await?;
        if claimed.is_empty() {
            return Ok(());
        }

        tracing::info!("Sending {} booking reminder(s)", claimed.len());

        let due = sqlx::query_as::<_, ServiceRequest>(&format!(
            "{REQUEST_SELECT} WHERE r.id = ANY($1)"
        ))
        .bind(&claimed)
        .fetch_all(&self.pool)
        .await?;

        for request in due {
            self.notifications
                .notify_booking(
                    &request.notice(),
                    NotificationKind::BookingReminder,
                    minijinja::context! {},
                )
                .await;
        }

        Ok(())
    }

    /// Mark due bookings as reminded before sending, so each is picked once
    /// even with several instances running
    async fn claim_due(&self) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE service_requests
            SET reminder_sent_at = NOW()
            WHERE id IN (
                SELECT id FROM service_requests
                WHERE status IN ('confirmed', 'assigned')
                  AND reminder_sent_at IS NULL
                  AND scheduled_at > NOW()
                  AND scheduled_at <= NOW() + make_interval(hours => $1::INT)
                ORDER BY scheduled_at
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id
            "#,
        )
        .bind(self.lead_hours as i32)
        .bind(BATCH_SIZE)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
