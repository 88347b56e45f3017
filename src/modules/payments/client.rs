use async_trait::async_trait;
use serde::Deserialize;

use crate::core::config::PaymentsConfig;
use crate::core::error::AppError;
use crate::shared::money::Money;

/// Off-session charge of a stored card
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub customer_id: String,
    pub payment_method_id: String,
    pub amount: Money,
    pub description: String,
    /// Booking id, echoed back in webhook metadata
    pub request_id: String,
    /// Same key for the same booking and purpose, so retries never double-charge
    pub idempotency_key: String,
}

#[derive(Debug, Clone)]
pub struct RefundRequest {
    pub payment_reference: String,
    pub amount: Money,
    pub idempotency_key: String,
}

#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// Vendor id of the payment or refund
    pub reference: String,
    pub status: String,
}

impl PaymentOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Failed to reach payments provider: {0}")]
    Transport(String),

    #[error("Card declined: {0}")]
    Declined(String),

    #[error("Payments provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Failed to parse payments provider response: {0}")]
    ParseError(String),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Declined(msg) => AppError::BadRequest(format!("Card declined: {}", msg)),
            other => AppError::ExternalServiceError(other.to_string()),
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: ChargeRequest) -> Result<PaymentOutcome, PaymentError>;

    async fn refund(&self, request: RefundRequest) -> Result<PaymentOutcome, PaymentError>;
}

#[derive(Debug, Deserialize)]
struct ObjectResponse {
    id: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Stripe-style REST client (form-encoded, bearer secret key)
pub struct PaymentClient {
    config: PaymentsConfig,
    client: reqwest::Client,
}

impl PaymentClient {
    pub fn new(config: PaymentsConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    async fn post_form(
        &self,
        path: &str,
        idempotency_key: &str,
        form: &[(&str, String)],
    ) -> Result<ObjectResponse, PaymentError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.config.secret_key)
            .header("Idempotency-Key", idempotency_key)
            .form(form)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &text));
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::ParseError(e.to_string()))
    }
}

/// 402 and card errors are declines; everything else is a provider failure
fn classify_error(status: u16, body: &str) -> PaymentError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if status == 402 || envelope.error.kind == "card_error" => {
            PaymentError::Declined(envelope.error.message)
        }
        Ok(envelope) => PaymentError::Provider {
            status,
            message: envelope.error.message,
        },
        Err(_) => PaymentError::Provider {
            status,
            message: body.to_string(),
        },
    }
}

#[async_trait]
impl PaymentGateway for PaymentClient {
    async fn charge(&self, request: ChargeRequest) -> Result<PaymentOutcome, PaymentError> {
        let form = [
            ("amount", request.amount.cents().to_string()),
            ("currency", self.config.currency.clone()),
            ("customer", request.customer_id),
            ("payment_method", request.payment_method_id),
            ("description", request.description),
            ("confirm", "true".to_string()),
            ("off_session", "true".to_string()),
            ("metadata[request_id]", request.request_id),
        ];

        let object = self
            .post_form("/v1/payment_intents", &request.idempotency_key, &form)
            .await?;

        tracing::info!(
            "Payment {} created with status {}",
            object.id,
            object.status
        );

        Ok(PaymentOutcome {
            reference: object.id,
            status: object.status,
        })
    }

    async fn refund(&self, request: RefundRequest) -> Result<PaymentOutcome, PaymentError> {
        let form = [
            ("payment_intent", request.payment_reference),
            ("amount", request.amount.cents().to_string()),
        ];

        let object = self
            .post_form("/v1/refunds", &request.idempotency_key, &form)
            .await?;

        tracing::info!("Refund {} created with status {}", object.id, object.status);

        Ok(PaymentOutcome {
            reference: object.id,
            status: object.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_error_is_declined() {
        let body = r#"{"error":{"type":"card_error","message":"Your card has insufficient funds."}}"#;
        assert!(matches!(
            classify_error(402, body),
            PaymentError::Declined(msg) if msg.contains("insufficient funds")
        ));
    }

    #[test]
    fn test_server_error_is_provider_error() {
        let body = r#"{"error":{"type":"api_error","message":"boom"}}"#;
        assert!(matches!(
            classify_error(500, body),
            PaymentError::Provider { status: 500, .. }
        ));
        assert!(matches!(
            classify_error(502, "<html>bad gateway</html>"),
            PaymentError::Provider { status: 502, .. }
        ));
    }

    #[test]
    fn test_declined_maps_to_bad_request() {
        let err: AppError = PaymentError::Declined("expired card".to_string()).into();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err: AppError = PaymentError::Transport("timeout".to_string()).into();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
    }

    #[test]
    fn test_outcome_succeeded() {
        let outcome = PaymentOutcome {
            reference: "pi_1".to_string(),
            status: "succeeded".to_string(),
        };
        assert!(outcome.succeeded());
    }
}
