use sqlx::{PgConnection, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::bookings::models::{progress_of, PaymentStatus, ServiceRequest, REQUEST_SELECT};
use crate::features::bookings::policies::{BookingAction, BookingStatus};
use crate::features::bookings::services::{payment_state, transitions};
use crate::features::payments::dtos::*;
use crate::modules::payments::verify_signature;
use crate::shared::money::Money;

const WEBHOOK_ACTOR: &str = "payments-webhook";

/// Applies signed payment provider events to bookings
pub struct PaymentWebhookService {
    pool: PgPool,
    webhook_secret: String,
}

impl PaymentWebhookService {
    pub fn new(pool: PgPool, webhook_secret: String) -> Self {
        Self {
            pool,
            webhook_secret,
        }
    }

    /// Check the signature over the raw body and decode the event
    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> Result<WebhookEvent> {
        let signature = signature
            .ok_or_else(|| AppError::Unauthorized("Missing webhook signature".to_string()))?;

        if !verify_signature(&self.webhook_secret, body, signature) {
            return Err(AppError::Unauthorized(
                "Invalid webhook signature".to_string(),
            ));
        }

        serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))
    }

    pub async fn handle(&self, event: WebhookEvent) -> Result<WebhookAckDto> {
        let known = matches!(
            event.event_type.as_str(),
            EVENT_PAYMENT_SUCCEEDED | EVENT_PAYMENT_FAILED | EVENT_REFUND_SUCCEEDED
        );
        if !known {
            tracing::debug!("Ignoring payments event type {}", event.event_type);
            return Ok(WebhookAckDto {
                received: true,
                applied: false,
            });
        }

        let mut tx = self.pool.begin().await?;

        let Some(request) = locate_booking(&mut tx, &event.data).await? else {
            tracing::warn!(
                "No booking for payments event {} ({})",
                event.event_type,
                event.data.id
            );
            return Ok(WebhookAckDto {
                received: true,
                applied: false,
            });
        };

        match event.event_type.as_str() {
            EVENT_PAYMENT_SUCCEEDED => {
                payment_state::set_payment_status(
                    &mut *tx,
                    request.id,
                    PaymentStatus::Paid,
                    Some(&event.data.id),
                )
                .await?;

                if request.status == BookingStatus::Verified {
                    let assignment = transitions::active_assignment(&mut *tx, request.id).await?;
                    transitions::apply(
                        &mut tx,
                        &request,
                        BookingAction::MarkPaid,
                        progress_of(assignment.as_ref()),
                        WEBHOOK_ACTOR,
                    )
                    .await?;
                }
            }
            EVENT_PAYMENT_FAILED => {
                // A late failure for an earlier attempt must not undo a settled payment
                if request.payment_status == PaymentStatus::Unpaid {
                    payment_state::set_payment_status(
                        &mut *tx,
                        request.id,
                        PaymentStatus::Failed,
                        Some(&event.data.id),
                    )
                    .await?;
                }
            }
            _ => {
                let refunded = refunded_amount(&request, event.data.amount);
                payment_state::set_payment_status(
                    &mut *tx,
                    request.id,
                    payment_state::status_after_refund(request.total_price_cents, refunded),
                    None,
                )
                .await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            "Applied payments event {} to booking {}",
            event.event_type,
            request.reference_number
        );

        Ok(WebhookAckDto {
            received: true,
            applied: true,
        })
    }
}

/// Find the booking by charge metadata, falling back to the payment reference
async fn locate_booking(
    conn: &mut PgConnection,
    object: &WebhookObject,
) -> Result<Option<ServiceRequest>> {
    if let Some(id) = object.request_id() {
        let request = sqlx::query_as::<_, ServiceRequest>(&format!(
            "{REQUEST_SELECT} WHERE r.id = $1 FOR UPDATE OF r"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        if request.is_some() {
            return Ok(request);
        }
    }

    let request = sqlx::query_as::<_, ServiceRequest>(&format!(
        "{REQUEST_SELECT} WHERE r.payment_reference = $1 FOR UPDATE OF r"
    ))
    .bind(object.payment_reference())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(request)
}

/// Refund size from the event, or the stored refund when the event omits it
fn refunded_amount(request: &ServiceRequest, amount: Option<i64>) -> Money {
    amount
        .map(Money::from_cents)
        .or(request.refund_amount_cents)
        .unwrap_or(request.total_price_cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::payments::sign_payload;
    use axum::http::StatusCode;
    use sqlx::postgres::PgPoolOptions;

    const SECRET: &str = "whsec_test";

    fn service() -> PaymentWebhookService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/servicehub_test")
            .unwrap();
        PaymentWebhookService::new(pool, SECRET.to_string())
    }

    #[tokio::test]
    async fn test_verify_accepts_signed_body() {
        let body = br#"{"type":"payment.failed","data":{"id":"pi_1"}}"#;
        let signature = sign_payload(SECRET, body);

        let event = service().verify(body, Some(&signature)).unwrap();
        assert_eq!(event.event_type, EVENT_PAYMENT_FAILED);
    }

    #[tokio::test]
    async fn test_verify_rejects_missing_or_bad_signature() {
        let body = br#"{"type":"payment.failed","data":{"id":"pi_1"}}"#;

        let err = service().verify(body, None).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let signature = sign_payload("other-secret", body);
        let err = service().verify(body, Some(&signature)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_verify_rejects_signed_garbage() {
        let body = b"not json";
        let signature = sign_payload(SECRET, body);

        let err = service().verify(body, Some(&signature)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_event_is_acknowledged_without_database() {
        let event: WebhookEvent = serde_json::from_value(serde_json::json!({
            "type": "customer.updated",
            "data": { "id": "cus_1" }
        }))
        .unwrap();

        let ack = service().handle(event).await.unwrap();
        assert!(ack.received);
        assert!(!ack.applied);
    }
}
