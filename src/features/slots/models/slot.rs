use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a bookable calendar slot
#[derive(Debug, Clone, FromRow)]
pub struct AvailableSlot {
    pub id: Uuid,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i32,
    pub booked_count: i32,
    pub created_at: DateTime<Utc>,
}

impl AvailableSlot {
    pub fn remaining(&self) -> i32 {
        (self.capacity - self.booked_count).max(0)
    }

    /// Whether a preferred date and time fall inside this slot
    pub fn covers(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.slot_date == date && self.start_time <= time && time < self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> AvailableSlot {
        AvailableSlot {
            id: Uuid::now_v7(),
            slot_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            capacity: 3,
            booked_count: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_covers_is_end_exclusive() {
        let slot = slot();
        let date = slot.slot_date;
        assert!(slot.covers(date, NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
        assert!(slot.covers(date, NaiveTime::from_hms_opt(11, 59, 0).unwrap()));
        assert!(!slot.covers(date, NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
        assert!(!slot.covers(
            date.succ_opt().unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        ));
    }

    #[test]
    fn test_remaining_never_negative() {
        let mut slot = slot();
        assert_eq!(slot.remaining(), 2);
        slot.booked_count = 5;
        assert_eq!(slot.remaining(), 0);
    }
}
