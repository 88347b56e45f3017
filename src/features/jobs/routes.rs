use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::jobs::handlers;
use crate::features::jobs::services::JobService;

pub fn routes(service: Arc<JobService>) -> Router {
    Router::new()
        .route("/api/agent/jobs", get(handlers::list_my_jobs))
        .route(
            "/api/agent/jobs/available",
            get(handlers::list_available_jobs),
        )
        .route("/api/agent/jobs/{id}", get(handlers::get_job))
        .route(
            "/api/agent/requests/{id}/accept",
            post(handlers::accept_job),
        )
        .route("/api/agent/jobs/{id}/checkin", post(handlers::check_in))
        .route("/api/agent/jobs/{id}/proof", post(handlers::upload_proof))
        .route("/api/agent/jobs/{id}/checkout", post(handlers::check_out))
        .route("/api/agent/jobs/{id}/cancel", post(handlers::withdraw_job))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        create_agent_user, create_client_user, with_user, TestServices,
    };
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use uuid::Uuid;

    async fn server_as(user: crate::features::auth::model::AuthenticatedUser) -> TestServer {
        let services = TestServices::new().await;
        TestServer::new(with_user(routes(services.jobs), user)).unwrap()
    }

    fn png() -> Part {
        Part::bytes(vec![0x89, b'P', b'N', b'G'])
            .file_name("before.png")
            .mime_type("image/png")
    }

    #[tokio::test]
    async fn test_clients_cannot_see_jobs() {
        let server = server_as(create_client_user()).await;

        server
            .get("/api/agent/jobs/available")
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .post(&format!("/api/agent/requests/{}/accept", Uuid::new_v4()))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_proof_requires_kind() {
        let server = server_as(create_agent_user()).await;

        server
            .post(&format!("/api/agent/jobs/{}/proof", Uuid::new_v4()))
            .multipart(MultipartForm::new().add_part("file", png()))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_proof_rejects_unknown_kind() {
        let server = server_as(create_agent_user()).await;

        let form = MultipartForm::new()
            .add_text("kind", "during")
            .add_part("file", png());

        server
            .post(&format!("/api/agent/jobs/{}/proof", Uuid::new_v4()))
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_proof_rejects_non_images() {
        let server = server_as(create_agent_user()).await;

        let form = MultipartForm::new().add_text("kind", "before").add_part(
            "file",
            Part::bytes(b"%PDF-1.7".to_vec())
                .file_name("invoice.pdf")
                .mime_type("application/pdf"),
        );

        server
            .post(&format!("/api/agent/jobs/{}/proof", Uuid::new_v4()))
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
