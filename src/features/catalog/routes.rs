use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::catalog::handlers;
use crate::features::catalog::services::CatalogService;

/// Catalog browsing, no auth
pub fn public_routes(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/api/services", get(handlers::list_services))
        .route("/api/services/{slug}", get(handlers::get_service))
        .with_state(service)
}

pub fn routes(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route(
            "/api/agent/suggestions",
            get(handlers::list_my_suggestions).post(handlers::create_suggestion),
        )
        .with_state(service)
}

pub fn admin_routes(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route(
            "/api/admin/services",
            get(handlers::admin_list_services).post(handlers::admin_create_service),
        )
        .route(
            "/api/admin/services/{id}",
            put(handlers::admin_update_service).delete(handlers::admin_deactivate_service),
        )
        .route(
            "/api/admin/suggestions",
            get(handlers::admin_list_suggestions),
        )
        .route(
            "/api/admin/suggestions/{id}/approve",
            post(handlers::admin_approve_suggestion),
        )
        .route(
            "/api/admin/suggestions/{id}/reject",
            post(handlers::admin_reject_suggestion),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_agent_user, create_client_user, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use sqlx::postgres::PgPoolOptions;

    fn service() -> Arc<CatalogService> {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/servicehub_test")
            .unwrap();
        Arc::new(CatalogService::new(pool))
    }

    #[tokio::test]
    async fn test_admin_routes_reject_agents() {
        let app = with_user(admin_routes(service()), create_agent_user());
        let server = TestServer::new(app).unwrap();

        server
            .get("/api/admin/services")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_suggestions_reject_clients() {
        let app = with_user(routes(service()), create_client_user());
        let server = TestServer::new(app).unwrap();

        server
            .post("/api/agent/suggestions")
            .json(&serde_json::json!({
                "name": "Window cleaning",
                "category": "cleaning",
                "suggestedPriceCents": 5000,
                "durationMinutes": 60
            }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_suggestion_validation_runs_before_database() {
        let app = with_user(routes(service()), create_agent_user());
        let server = TestServer::new(app).unwrap();

        server
            .post("/api/agent/suggestions")
            .json(&serde_json::json!({
                "name": "W",
                "category": "cleaning",
                "suggestedPriceCents": -5,
                "durationMinutes": 60
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
