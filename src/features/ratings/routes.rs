use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::ratings::handlers;
use crate::features::ratings::services::RatingService;

pub fn routes(service: Arc<RatingService>) -> Router {
    Router::new()
        .route("/api/requests/{id}/rate", post(handlers::rate_agent))
        .route("/api/agent/jobs/{id}/rate", post(handlers::rate_client))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::profiles::ProfileService;
    use crate::shared::test_helpers::{create_agent_user, create_client_user, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn service() -> Arc<RatingService> {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/servicehub_test")
            .unwrap();
        let profiles = Arc::new(ProfileService::new(pool.clone()));
        Arc::new(RatingService::new(pool, profiles))
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_rejected() {
        let app = with_user(routes(service()), create_client_user());
        let server = TestServer::new(app).unwrap();

        server
            .post(&format!("/api/requests/{}/rate", Uuid::new_v4()))
            .json(&serde_json::json!({ "score": 6 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_agent_cannot_use_client_rating_route() {
        let app = with_user(routes(service()), create_agent_user());
        let server = TestServer::new(app).unwrap();

        server
            .post(&format!("/api/requests/{}/rate", Uuid::new_v4()))
            .json(&serde_json::json!({ "score": 4 }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_client_cannot_rate_as_agent() {
        let app = with_user(routes(service()), create_client_user());
        let server = TestServer::new(app).unwrap();

        server
            .post(&format!("/api/agent/jobs/{}/rate", Uuid::new_v4()))
            .json(&serde_json::json!({ "score": 4 }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
