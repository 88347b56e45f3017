use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::bookings::models::{BookingEvent, JobAssignment, PaymentStatus, ServiceRequest};
use crate::features::bookings::policies::{BookingAction, BookingStatus};
use crate::shared::money::Money;

/// Request DTO for booking a service
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingDto {
    pub service_id: Uuid,

    /// Local date in the service area
    pub preferred_date: NaiveDate,

    /// Local time in the service area
    #[schema(value_type = String, example = "09:30:00")]
    pub preferred_time: NaiveTime,

    /// One of the caller's saved addresses
    pub address_id: Option<Uuid>,

    /// Calendar slot to reserve; must cover the preferred date and time
    pub slot_id: Option<Uuid>,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

/// Query params for listing bookings
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct BookingQueryParams {
    /// Filter by status
    pub status: Option<BookingStatus>,
}

/// Request DTO for cancelling a booking
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingDto {
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

/// Booking summary used in lists
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponseDto {
    pub id: Uuid,
    pub reference_number: String,
    pub client_id: String,
    pub service_id: Uuid,
    pub service_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<Uuid>,
    pub preferred_date: NaiveDate,
    #[schema(value_type = String)]
    pub preferred_time: NaiveTime,
    pub scheduled_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub total_price_cents: Money,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_fee_cents: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_amount_cents: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ServiceRequest> for BookingResponseDto {
    fn from(r: ServiceRequest) -> Self {
        Self {
            id: r.id,
            reference_number: r.reference_number,
            client_id: r.client_id,
            service_id: r.service_id,
            service_name: r.service_name,
            address_id: r.address_id,
            slot_id: r.slot_id,
            preferred_date: r.preferred_date,
            preferred_time: r.preferred_time,
            scheduled_at: r.scheduled_at,
            notes: r.notes,
            status: r.status,
            total_price_cents: r.total_price_cents,
            payment_status: r.payment_status,
            cancellation_fee_cents: r.cancellation_fee_cents,
            refund_amount_cents: r.refund_amount_cents,
            cancellation_reason: r.cancellation_reason,
            cancelled_at: r.cancelled_at,
            completed_at: r.completed_at,
            created_at: r.created_at,
        }
    }
}

/// The active agent assignment of a booking
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponseDto {
    pub id: Uuid,
    pub agent_id: String,
    pub assigned_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_out_at: Option<DateTime<Utc>>,
    /// Presigned, short-lived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

impl AssignmentResponseDto {
    pub fn from_assignment(
        a: &JobAssignment,
        before_photo_url: Option<String>,
        after_photo_url: Option<String>,
    ) -> Self {
        Self {
            id: a.id,
            agent_id: a.agent_id.clone(),
            assigned_at: a.assigned_at,
            checked_in_at: a.checked_in_at,
            checked_out_at: a.checked_out_at,
            before_photo_url,
            after_photo_url,
            verified_at: a.verified_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingEventDto {
    pub from_status: BookingStatus,
    pub to_status: BookingStatus,
    pub action: String,
    pub actor_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<BookingEvent> for BookingEventDto {
    fn from(e: BookingEvent) -> Self {
        Self {
            from_status: e.from_status,
            to_status: e.to_status,
            action: e.action,
            actor_id: e.actor_id,
            created_at: e.created_at,
        }
    }
}

/// Booking with its assignment, history and the actions its status allows
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetailDto {
    #[serde(flatten)]
    pub booking: BookingResponseDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<AssignmentResponseDto>,
    pub allowed_actions: Vec<BookingAction>,
    pub events: Vec<BookingEventDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto() -> CreateBookingDto {
        CreateBookingDto {
            service_id: Uuid::now_v7(),
            preferred_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            preferred_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            address_id: None,
            slot_id: None,
            notes: None,
        }
    }

    #[test]
    fn test_notes_length_limit() {
        let mut dto = create_dto();
        assert!(dto.validate().is_ok());

        dto.notes = Some("x".repeat(1001));
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_booking_accepts_camel_case() {
        let dto: CreateBookingDto = serde_json::from_value(serde_json::json!({
            "serviceId": "01933b8e-7d4a-7c3e-8f1a-2b3c4d5e6f70",
            "preferredDate": "2026-03-14",
            "preferredTime": "09:30:00"
        }))
        .unwrap();
        assert_eq!(dto.preferred_time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(dto.slot_id.is_none());
    }

    #[test]
    fn test_status_filter_uses_snake_case() {
        let params: BookingQueryParams =
            serde_json::from_value(serde_json::json!({ "status": "pending_verification" }))
                .unwrap();
        assert_eq!(params.status, Some(BookingStatus::PendingVerification));
    }
}
