use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::payments::handlers;
use crate::features::payments::services::PaymentWebhookService;

/// Provider callbacks, authenticated by signature instead of a bearer token
pub fn public_routes(service: Arc<PaymentWebhookService>) -> Router {
    Router::new()
        .route("/api/payments/webhook", post(handlers::payment_webhook))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::payments::sign_payload;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use sqlx::postgres::PgPoolOptions;

    const SECRET: &str = "whsec_test";

    fn server() -> TestServer {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/servicehub_test")
            .unwrap();
        let service = Arc::new(PaymentWebhookService::new(pool, SECRET.to_string()));
        TestServer::new(public_routes(service)).unwrap()
    }

    #[tokio::test]
    async fn test_unsigned_webhook_is_unauthorized() {
        server()
            .post("/api/payments/webhook")
            .bytes(br#"{"type":"payment.succeeded","data":{"id":"pi_1"}}"#.as_slice().into())
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrongly_signed_webhook_is_unauthorized() {
        let body = br#"{"type":"payment.succeeded","data":{"id":"pi_1"}}"#;
        let signature = sign_payload("other-secret", body);

        server()
            .post("/api/payments/webhook")
            .add_header(
                HeaderName::from_static(handlers::SIGNATURE_HEADER),
                HeaderValue::from_str(&signature).unwrap(),
            )
            .bytes(body.as_slice().into())
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signed_unknown_event_is_acknowledged() {
        let body = br#"{"type":"customer.updated","data":{"id":"cus_1"}}"#;
        let signature = sign_payload(SECRET, body);

        let response = server()
            .post("/api/payments/webhook")
            .add_header(
                HeaderName::from_static(handlers::SIGNATURE_HEADER),
                HeaderValue::from_str(&signature).unwrap(),
            )
            .bytes(body.as_slice().into())
            .await;

        response.assert_status_ok();
        let json: serde_json::Value = response.json();
        assert_eq!(json["data"]["applied"], false);
    }
}
