//! Role-based authorization guards for the application.
//!
//! These guards extract the authenticated user and verify they have the required roles.
//!
//! Role hierarchy:
//! - admin: everything, including the admin console
//! - agent: job board, own jobs, catalog suggestions
//! - client: bookings, cancellations, ratings
//!
//! Admin includes the permissions of both agent and client. Agent and client
//! are disjoint.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn current_user(parts: &Parts) -> Result<AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for admin-only endpoints.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user))
    }
}

/// Guard for agent portal endpoints.
///
/// Allows users with "admin" or "agent" roles. The stored agent profile is
/// checked separately by the services that need it.
pub struct RequireAgent(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAgent
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)?;

        if !user.has_agent_access() {
            return Err(AppError::Forbidden("Agent access required".to_string()));
        }

        Ok(RequireAgent(user))
    }
}

/// Guard for client portal endpoints.
///
/// Allows users with "admin" or "client" roles.
pub struct RequireClient(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireClient
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)?;

        if !user.has_client_access() {
            return Err(AppError::Forbidden("Client access required".to_string()));
        }

        Ok(RequireClient(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        create_admin_user, create_agent_user, create_client_user, with_user,
    };
    use axum::{http::StatusCode, routing::get, Router};
    use axum_test::TestServer;

    async fn admin_only(RequireAdmin(user): RequireAdmin) -> String {
        user.sub
    }

    async fn agent_only(RequireAgent(user): RequireAgent) -> String {
        user.sub
    }

    async fn client_only(RequireClient(user): RequireClient) -> String {
        user.sub
    }

    fn router() -> Router {
        Router::new()
            .route("/admin", get(admin_only))
            .route("/agent", get(agent_only))
            .route("/client", get(client_only))
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        let server = TestServer::new(router()).unwrap();

        let response = server.get("/admin").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_passes_every_guard() {
        let server = TestServer::new(with_user(router(), create_admin_user())).unwrap();

        for path in ["/admin", "/agent", "/client"] {
            let response = server.get(path).await;
            response.assert_status_ok();
            response.assert_text("test-admin");
        }
    }

    #[tokio::test]
    async fn test_agent_cannot_use_client_or_admin_endpoints() {
        let server = TestServer::new(with_user(router(), create_agent_user())).unwrap();

        server.get("/agent").await.assert_status_ok();
        server
            .get("/client")
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .get("/admin")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_client_cannot_use_agent_endpoints() {
        let server = TestServer::new(with_user(router(), create_client_user())).unwrap();

        server.get("/client").await.assert_status_ok();
        let response = server.get("/agent").await;
        response.assert_status(StatusCode::FORBIDDEN);

        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Agent access required");
    }
}
