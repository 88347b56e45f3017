use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Admin console routes (all require the admin role)
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route("/api/admin/bookings", get(handlers::list_bookings))
        .route("/api/admin/bookings/{id}", get(handlers::get_booking))
        .route(
            "/api/admin/bookings/{id}/confirm",
            post(handlers::confirm_booking),
        )
        .route(
            "/api/admin/bookings/{id}/assign",
            post(handlers::assign_agent),
        )
        .route(
            "/api/admin/bookings/{id}/verify",
            post(handlers::verify_booking),
        )
        .route(
            "/api/admin/bookings/{id}/reject-proof",
            post(handlers::reject_proof),
        )
        .route(
            "/api/admin/bookings/{id}/charge",
            post(handlers::charge_booking),
        )
        .route(
            "/api/admin/bookings/{id}/complete",
            post(handlers::complete_booking),
        )
        .route(
            "/api/admin/bookings/{id}/cancel",
            post(handlers::cancel_booking),
        )
        .route("/api/admin/agents", get(handlers::list_agents))
        .route("/api/admin/agents/{id}/tier", put(handlers::set_agent_tier))
        .route(
            "/api/admin/agents/{id}/active",
            put(handlers::set_agent_active),
        )
        .route("/api/admin/stats", get(handlers::dashboard_stats))
        .with_state(admin_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        create_admin_user, create_agent_user, create_client_user, with_user, TestServices,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use uuid::Uuid;

    async fn server_as(user: crate::features::auth::model::AuthenticatedUser) -> TestServer {
        let services = TestServices::new().await;
        TestServer::new(with_user(routes(services.admin), user)).unwrap()
    }

    #[tokio::test]
    async fn test_non_admins_are_forbidden() {
        for user in [create_agent_user(), create_client_user()] {
            let server = server_as(user).await;

            server
                .get("/api/admin/stats")
                .await
                .assert_status(StatusCode::FORBIDDEN);
            server
                .post(&format!("/api/admin/bookings/{}/confirm", Uuid::new_v4()))
                .await
                .assert_status(StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn test_assign_requires_agent_id() {
        let server = server_as(create_admin_user()).await;

        server
            .post(&format!("/api/admin/bookings/{}/assign", Uuid::new_v4()))
            .json(&serde_json::json!({ "agentId": "" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_tier_is_rejected() {
        let server = server_as(create_admin_user()).await;

        server
            .put("/api/admin/agents/agent-1/tier")
            .json(&serde_json::json!({ "tier": "diamond" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_booking_id_is_rejected() {
        let server = server_as(create_admin_user()).await;

        server
            .get("/api/admin/bookings/not-a-uuid")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
