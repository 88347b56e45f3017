//! Cancellation fee policy.
//!
//! The fee depends only on how far away the appointment is when the client
//! cancels. Brackets are inclusive at their upper edge: exactly two hours
//! before the appointment is still short notice.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::money::Money;

pub const SHORT_NOTICE_HOURS: i64 = 2;
pub const SAME_DAY_NOTICE_HOURS: i64 = 8;
pub const LATE_NOTICE_HOURS: i64 = 24;

pub const SHORT_NOTICE_FEE: Money = Money::from_cents(4000);
pub const SAME_DAY_NOTICE_FEE: Money = Money::from_cents(2000);
pub const LATE_NOTICE_FEE: Money = Money::from_cents(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CancellationTier {
    /// Two hours or less, including appointments already under way
    ShortNotice,
    /// More than two and at most eight hours
    SameDay,
    /// More than eight and at most twenty-four hours
    Late,
    Free,
}

impl CancellationTier {
    pub fn for_remaining(remaining: Duration) -> Self {
        if remaining <= Duration::hours(SHORT_NOTICE_HOURS) {
            CancellationTier::ShortNotice
        } else if remaining <= Duration::hours(SAME_DAY_NOTICE_HOURS) {
            CancellationTier::SameDay
        } else if remaining <= Duration::hours(LATE_NOTICE_HOURS) {
            CancellationTier::Late
        } else {
            CancellationTier::Free
        }
    }

    pub fn fee(self) -> Money {
        match self {
            CancellationTier::ShortNotice => SHORT_NOTICE_FEE,
            CancellationTier::SameDay => SAME_DAY_NOTICE_FEE,
            CancellationTier::Late => LATE_NOTICE_FEE,
            CancellationTier::Free => Money::ZERO,
        }
    }
}

/// Fee owed when a booking scheduled at `scheduled_at` is cancelled at `now`
pub fn cancellation_fee(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> Money {
    CancellationTier::for_remaining(scheduled_at - now).fee()
}

/// Amount returned to the client, never negative
pub fn refund_amount(total: Money, fee: Money) -> Money {
    total.saturating_sub(fee)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancellationQuote {
    /// Hours until the appointment, negative once it has started
    pub hours_until: f64,
    pub tier: CancellationTier,
    pub fee_cents: Money,
    pub refund_cents: Money,
}

pub fn quote(scheduled_at: DateTime<Utc>, now: DateTime<Utc>, total: Money) -> CancellationQuote {
    let remaining = scheduled_at - now;
    let tier = CancellationTier::for_remaining(remaining);
    let fee = tier.fee();

    CancellationQuote {
        hours_until: remaining.num_seconds() as f64 / 3600.0,
        tier,
        fee_cents: fee,
        refund_cents: refund_amount(total, fee),
    }
}

/// Quote used when an admin cancels: fee waived, everything refunded
pub fn waived_quote(scheduled_at: DateTime<Utc>, now: DateTime<Utc>, total: Money) -> CancellationQuote {
    CancellationQuote {
        fee_cents: Money::ZERO,
        refund_cents: total,
        ..quote(scheduled_at, now, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    fn fee_at(remaining: Duration) -> i64 {
        cancellation_fee(now() + remaining, now()).cents()
    }

    #[test]
    fn test_short_notice_boundary() {
        assert_eq!(fee_at(Duration::hours(2)), 4000);
        assert_eq!(fee_at(Duration::hours(2) + Duration::seconds(1)), 2000);
    }

    #[test]
    fn test_same_day_boundary() {
        assert_eq!(fee_at(Duration::hours(8)), 2000);
        assert_eq!(fee_at(Duration::hours(8) + Duration::seconds(1)), 1000);
    }

    #[test]
    fn test_late_boundary() {
        assert_eq!(fee_at(Duration::hours(24)), 1000);
        assert_eq!(fee_at(Duration::hours(24) + Duration::seconds(1)), 0);
    }

    #[test]
    fn test_far_future_is_free() {
        assert_eq!(fee_at(Duration::days(7)), 0);
    }

    #[test]
    fn test_started_or_past_appointment_is_short_notice() {
        assert_eq!(fee_at(Duration::zero()), 4000);
        assert_eq!(fee_at(-Duration::hours(3)), 4000);
    }

    #[test]
    fn test_refund_floor() {
        for total in [0, 500, 999, 1000, 1001, 4000, 12_500] {
            for fee in [0, 1000, 2000, 4000] {
                let refund = refund_amount(Money::from_cents(total), Money::from_cents(fee));
                assert_eq!(refund.cents(), (total - fee).max(0));
            }
        }
    }

    #[test]
    fn test_quote() {
        let quote = quote(
            now() + Duration::hours(5),
            now(),
            Money::from_cents(7500),
        );

        assert_eq!(quote.tier, CancellationTier::SameDay);
        assert_eq!(quote.fee_cents.cents(), 2000);
        assert_eq!(quote.refund_cents.cents(), 5500);
        assert!((quote.hours_until - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_waived_quote_refunds_everything() {
        let quote = waived_quote(now() + Duration::hours(1), now(), Money::from_cents(7500));

        assert_eq!(quote.tier, CancellationTier::ShortNotice);
        assert!(quote.fee_cents.is_zero());
        assert_eq!(quote.refund_cents.cents(), 7500);
    }
}
