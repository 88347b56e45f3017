use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::bookings::policies::{BookingStatus, JobProgress};
use crate::features::notifications::models::BookingNotice;
use crate::shared::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Failed,
    Refunded,
    PartiallyRefunded,
}

/// Columns of a booking joined with its catalog service name
pub const REQUEST_SELECT: &str = r#"
    SELECT r.id, r.reference_number, r.client_id, r.service_id, s.name AS service_name,
           r.address_id, r.slot_id, r.preferred_date, r.preferred_time, r.scheduled_at,
           r.notes, r.status, r.total_price_cents, r.payment_status, r.payment_reference,
           r.cancellation_fee_cents, r.refund_amount_cents, r.cancellation_reason,
           r.cancelled_by, r.cancelled_at, r.reminder_sent_at, r.completed_at,
           r.created_at, r.updated_at
    FROM service_requests r
    JOIN service_catalog s ON s.id = r.service_id
"#;

/// Database model for a booking
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub reference_number: String,
    pub client_id: String,
    pub service_id: Uuid,
    pub service_name: String,
    pub address_id: Option<Uuid>,
    pub slot_id: Option<Uuid>,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    pub scheduled_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub total_price_cents: Money,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub cancellation_fee_cents: Option<Money>,
    pub refund_amount_cents: Option<Money>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRequest {
    pub fn notice(&self) -> BookingNotice {
        BookingNotice {
            client_id: self.client_id.clone(),
            request_id: self.id,
            reference_number: self.reference_number.clone(),
            service_name: self.service_name.clone(),
            scheduled_at: self.scheduled_at,
        }
    }
}

pub const ASSIGNMENT_COLUMNS: &str = "id, request_id, agent_id, is_active, assigned_by, assigned_at, \
     checked_in_at, checked_out_at, before_photo_key, after_photo_key, withdrawn_at, \
     withdraw_reason, verified_at, verified_by, created_at, updated_at";

/// Database model for the link between a booking and the agent doing it
#[derive(Debug, Clone, FromRow)]
pub struct JobAssignment {
    pub id: Uuid,
    pub request_id: Uuid,
    pub agent_id: String,
    pub is_active: bool,
    pub assigned_by: String,
    pub assigned_at: DateTime<Utc>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub before_photo_key: Option<String>,
    pub after_photo_key: Option<String>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub withdraw_reason: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobAssignment {
    pub fn progress(&self) -> JobProgress {
        JobProgress {
            checked_in: self.checked_in_at.is_some(),
            has_before_photo: self.before_photo_key.is_some(),
            has_after_photo: self.after_photo_key.is_some(),
        }
    }
}

/// Progress of an optional assignment; no assignment means no progress
pub fn progress_of(assignment: Option<&JobAssignment>) -> JobProgress {
    assignment.map(JobAssignment::progress).unwrap_or_default()
}

/// Audit row written for every lifecycle transition
#[derive(Debug, Clone, FromRow)]
pub struct BookingEvent {
    pub id: Uuid,
    pub request_id: Uuid,
    pub from_status: BookingStatus,
    pub to_status: BookingStatus,
    pub action: String,
    pub actor_id: String,
    pub created_at: DateTime<Utc>,
}

/// Human-facing booking number, e.g. `BK-2026-0000042`
pub fn format_reference(year: i32, sequence: i64) -> String {
    format!("BK-{}-{:07}", year, sequence)
}

pub fn reference_year(now: DateTime<Utc>, offset: FixedOffset) -> i32 {
    now.with_timezone(&offset).year()
}

/// Interpret a preferred date and time in the service area's offset
pub fn scheduled_at(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|local| local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_is_zero_padded() {
        assert_eq!(format_reference(2026, 42), "BK-2026-0000042");
        assert_eq!(format_reference(2026, 12_345_678), "BK-2026-12345678");
    }

    #[test]
    fn test_scheduled_at_uses_service_area_offset() {
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();

        let at = scheduled_at(date, time, offset).unwrap();
        assert_eq!(at.to_rfc3339(), "2026-03-14T02:30:00+00:00");
    }

    #[test]
    fn test_reference_year_follows_local_calendar() {
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let new_year_local = Utc.with_ymd_and_hms(2025, 12, 31, 20, 0, 0).unwrap();
        assert_eq!(reference_year(new_year_local, offset), 2026);
        assert_eq!(reference_year(new_year_local, FixedOffset::east_opt(0).unwrap()), 2025);
    }

    #[test]
    fn test_progress_of_missing_assignment() {
        assert_eq!(progress_of(None), JobProgress::default());
    }
}
