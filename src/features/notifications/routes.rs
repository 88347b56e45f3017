use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::notifications::handlers;
use crate::features::notifications::services::NotificationService;

pub fn routes(service: Arc<NotificationService>) -> Router {
    Router::new()
        .route("/api/notifications", get(handlers::list_notifications))
        .route(
            "/api/notifications/send",
            post(handlers::send_notification),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        create_admin_user, create_agent_user, with_user, TestServices,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_only_admins_send() {
        let services = TestServices::new().await;
        let app = with_user(routes(services.notifications), create_agent_user());
        let server = TestServer::new(app).unwrap();

        server
            .post("/api/notifications/send")
            .json(&serde_json::json!({ "userIds": ["client-1"], "message": "Hello" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_send_needs_template_or_message() {
        let services = TestServices::new().await;
        let app = with_user(routes(services.notifications), create_admin_user());
        let server = TestServer::new(app).unwrap();

        server
            .post("/api/notifications/send")
            .json(&serde_json::json!({ "userIds": ["client-1"] }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
