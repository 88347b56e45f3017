use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::profiles::handlers;
use crate::features::profiles::services::ProfileService;

pub fn routes(service: Arc<ProfileService>) -> Router {
    Router::new()
        .route(
            "/api/profile/me",
            get(handlers::get_me).put(handlers::update_me),
        )
        .route(
            "/api/profile/agent",
            get(handlers::get_agent_profile).put(handlers::update_agent_profile),
        )
        .route(
            "/api/profile/addresses",
            get(handlers::list_addresses).post(handlers::create_address),
        )
        .route(
            "/api/profile/addresses/{id}",
            put(handlers::update_address).delete(handlers::delete_address),
        )
        .route(
            "/api/profile/notification-preferences",
            get(handlers::get_notification_preferences)
                .put(handlers::update_notification_preferences),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_client_user, lazy_pool};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_requests_without_user_are_unauthorized() {
        let app = routes(Arc::new(ProfileService::new(lazy_pool())));
        let server = TestServer::new(app).unwrap();

        server
            .get("/api/profile/me")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_address_validation_runs_before_database() {
        let app = crate::shared::test_helpers::with_user(
            routes(Arc::new(ProfileService::new(lazy_pool()))),
            create_client_user(),
        );
        let server = TestServer::new(app).unwrap();

        server
            .post("/api/profile/addresses")
            .json(&serde_json::json!({ "label": "", "line1": "1 Main St", "city": "Springfield" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
