use sqlx::PgExecutor;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::bookings::models::PaymentStatus;
use crate::shared::money::Money;

/// Record the outcome of a charge or refund on a booking
///
/// `reference` is kept when `None` is passed.
pub async fn set_payment_status<'e, E>(
    executor: E,
    request_id: Uuid,
    status: PaymentStatus,
    reference: Option<&str>,
) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE service_requests
        SET payment_status = $2,
            payment_reference = COALESCE($3, payment_reference),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(request_id)
    .bind(status)
    .bind(reference)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Payment status after refunding `refunded` out of `total`
pub fn status_after_refund(total: Money, refunded: Money) -> PaymentStatus {
    if refunded >= total {
        PaymentStatus::Refunded
    } else {
        PaymentStatus::PartiallyRefunded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_after_refund() {
        let total = Money::from_cents(12_000);
        assert_eq!(status_after_refund(total, total), PaymentStatus::Refunded);
        assert_eq!(
            status_after_refund(total, Money::from_cents(8_000)),
            PaymentStatus::PartiallyRefunded
        );
    }
}
