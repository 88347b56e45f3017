use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::slots::handlers;
use crate::features::slots::services::SlotService;

pub fn public_routes(service: Arc<SlotService>) -> Router {
    Router::new()
        .route("/api/slots", get(handlers::list_slots))
        .with_state(service)
}

pub fn admin_routes(service: Arc<SlotService>) -> Router {
    Router::new()
        .route("/api/admin/slots", post(handlers::create_slot))
        .route("/api/admin/slots/{id}", delete(handlers::delete_slot))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_admin_user, create_client_user, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use sqlx::postgres::PgPoolOptions;

    fn service() -> Arc<SlotService> {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/servicehub_test")
            .unwrap();
        Arc::new(SlotService::new(pool))
    }

    #[tokio::test]
    async fn test_inverted_window_is_rejected() {
        let server = TestServer::new(public_routes(service())).unwrap();

        server
            .get("/api/slots")
            .add_query_param("from", "2026-03-10")
            .add_query_param("to", "2026-03-01")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_slot_requires_admin() {
        let server =
            TestServer::new(with_user(admin_routes(service()), create_client_user())).unwrap();

        server
            .post("/api/admin/slots")
            .json(&serde_json::json!({
                "slotDate": "2026-03-10",
                "startTime": "09:00:00",
                "endTime": "12:00:00",
                "capacity": 2
            }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_slot_rejects_inverted_times() {
        let server =
            TestServer::new(with_user(admin_routes(service()), create_admin_user())).unwrap();

        server
            .post("/api/admin/slots")
            .json(&serde_json::json!({
                "slotDate": "2026-03-10",
                "startTime": "12:00:00",
                "endTime": "09:00:00",
                "capacity": 2
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
