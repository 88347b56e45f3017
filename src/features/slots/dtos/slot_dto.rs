use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::core::error::AppError;
use crate::features::slots::models::AvailableSlot;

/// Widest window a single listing may cover
pub const MAX_SLOT_WINDOW_DAYS: i64 = 62;

/// Window used when `to` is omitted
pub const DEFAULT_SLOT_WINDOW_DAYS: i64 = 14;

/// Response DTO for a calendar slot
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponseDto {
    pub id: Uuid,
    pub slot_date: NaiveDate,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "12:00:00")]
    pub end_time: NaiveTime,
    pub capacity: i32,
    pub booked_count: i32,
    pub remaining: i32,
}

impl From<AvailableSlot> for SlotResponseDto {
    fn from(s: AvailableSlot) -> Self {
        Self {
            remaining: s.remaining(),
            id: s.id,
            slot_date: s.slot_date,
            start_time: s.start_time,
            end_time: s.end_time,
            capacity: s.capacity,
            booked_count: s.booked_count,
        }
    }
}

/// Query params for listing slots
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SlotQueryParams {
    /// First day (YYYY-MM-DD), default today
    pub from: Option<NaiveDate>,
    /// Last day inclusive (YYYY-MM-DD), default `from` + 14 days
    pub to: Option<NaiveDate>,
}

impl SlotQueryParams {
    /// Resolve the requested window against `today`
    pub fn window(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
        let from = self.from.unwrap_or(today);
        let to = self
            .to
            .unwrap_or(from + Duration::days(DEFAULT_SLOT_WINDOW_DAYS));

        if to < from {
            return Err(AppError::BadRequest(
                "'to' must not be before 'from'".to_string(),
            ));
        }
        if (to - from).num_days() > MAX_SLOT_WINDOW_DAYS {
            return Err(AppError::BadRequest(format!(
                "Window may span at most {} days",
                MAX_SLOT_WINDOW_DAYS
            )));
        }

        Ok((from, to))
    }
}

/// Request DTO for creating a slot (admin)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_slot_times"))]
pub struct CreateSlotDto {
    pub slot_date: NaiveDate,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "12:00:00")]
    pub end_time: NaiveTime,
    #[validate(range(min = 1, max = 100, message = "Capacity must be 1-100"))]
    pub capacity: i32,
}

fn validate_slot_times(dto: &CreateSlotDto) -> Result<(), ValidationError> {
    if dto.end_time <= dto.start_time {
        return Err(ValidationError::new("slot_times")
            .with_message("End time must be after start time".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_window_defaults() {
        let params = SlotQueryParams { from: None, to: None };
        assert_eq!(params.window(date(1)).unwrap(), (date(1), date(15)));
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        let params = SlotQueryParams {
            from: Some(date(10)),
            to: Some(date(9)),
        };
        assert!(params.window(date(1)).is_err());
    }

    #[test]
    fn test_window_rejects_oversized_range() {
        let from = date(1);
        let params = SlotQueryParams {
            from: Some(from),
            to: Some(from + Duration::days(MAX_SLOT_WINDOW_DAYS + 1)),
        };
        assert!(params.window(from).is_err());

        let params = SlotQueryParams {
            from: Some(from),
            to: Some(from + Duration::days(MAX_SLOT_WINDOW_DAYS)),
        };
        assert!(params.window(from).is_ok());
    }

    #[test]
    fn test_single_day_window() {
        let params = SlotQueryParams {
            from: Some(date(5)),
            to: Some(date(5)),
        };
        assert_eq!(params.window(date(1)).unwrap(), (date(5), date(5)));
    }

    #[test]
    fn test_slot_end_must_follow_start() {
        let dto = CreateSlotDto {
            slot_date: date(3),
            start_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            capacity: 2,
        };
        assert!(dto.validate().is_err());

        let dto = CreateSlotDto {
            end_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            ..dto
        };
        assert!(dto.validate().is_ok());
    }
}
