use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};

use crate::core::error::Result;
use crate::features::payments::dtos::{WebhookAckDto, WebhookEvent};
use crate::features::payments::services::PaymentWebhookService;
use crate::shared::types::ApiResponse;

pub const SIGNATURE_HEADER: &str = "x-payment-signature";

/// Payments provider webhook
///
/// The body must be signed with `X-Payment-Signature`, a hex HMAC-SHA256 of
/// the raw request body keyed with the webhook secret.
#[utoipa::path(
    post,
    path = "/api/payments/webhook",
    request_body = WebhookEvent,
    params(("X-Payment-Signature" = String, Header, description = "Hex HMAC-SHA256 of the raw body")),
    responses(
        (status = 200, description = "Event received", body = ApiResponse<WebhookAckDto>),
        (status = 400, description = "Malformed event"),
        (status = 401, description = "Missing or invalid signature")
    ),
    tag = "payments"
)]
pub async fn payment_webhook(
    State(service): State<Arc<PaymentWebhookService>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<WebhookAckDto>>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let event = service.verify(&body, signature)?;
    let ack = service.handle(event).await?;

    Ok(Json(ApiResponse::success(Some(ack), None, None)))
}
