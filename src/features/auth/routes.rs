use crate::features::auth::handler;
use crate::features::profiles::ProfileService;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Protected auth routes (require JWT authentication)
pub fn routes(profiles: Arc<ProfileService>) -> Router {
    Router::new()
        .route("/api/auth/me", get(handler::get_me))
        .with_state(profiles)
}
