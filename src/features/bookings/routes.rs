use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::bookings::handlers;
use crate::features::bookings::services::BookingService;

pub fn routes(service: Arc<BookingService>) -> Router {
    Router::new()
        .route(
            "/api/requests",
            get(handlers::list_bookings).post(handlers::create_booking),
        )
        .route("/api/requests/{id}", get(handlers::get_booking))
        .route(
            "/api/requests/{id}/cancellation-quote",
            get(handlers::get_cancellation_quote),
        )
        .route("/api/requests/{id}/cancel", post(handlers::cancel_booking))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        create_agent_user, create_client_user, with_user, TestServices,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use uuid::Uuid;

    fn booking_body(notes: &str) -> serde_json::Value {
        serde_json::json!({
            "serviceId": Uuid::new_v4(),
            "preferredDate": "2030-01-15",
            "preferredTime": "09:30:00",
            "notes": notes
        })
    }

    #[tokio::test]
    async fn test_agents_cannot_book() {
        let services = TestServices::new().await;
        let app = with_user(routes(services.bookings), create_agent_user());
        let server = TestServer::new(app).unwrap();

        server
            .post("/api/requests")
            .json(&booking_body("ring twice"))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_overlong_notes_are_rejected() {
        let services = TestServices::new().await;
        let app = with_user(routes(services.bookings), create_client_user());
        let server = TestServer::new(app).unwrap();

        server
            .post("/api/requests")
            .json(&booking_body(&"x".repeat(1001)))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_time_is_rejected() {
        let services = TestServices::new().await;
        let app = with_user(routes(services.bookings), create_client_user());
        let server = TestServer::new(app).unwrap();

        server
            .post("/api/requests")
            .json(&serde_json::json!({
                "serviceId": Uuid::new_v4(),
                "preferredDate": "2030-01-15",
                "preferredTime": "half past nine"
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
