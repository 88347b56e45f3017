use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::dtos::*;
use crate::features::notifications::services::NotificationService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Send an SMS to one or more users (admin only)
#[utoipa::path(
    post,
    path = "/api/notifications/send",
    request_body = SendNotificationDto,
    responses(
        (status = 200, description = "Messages processed", body = ApiResponse<SendNotificationResultDto>),
        (status = 400, description = "Validation error or unknown template"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn send_notification(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<NotificationService>>,
    AppJson(dto): AppJson<SendNotificationDto>,
) -> Result<Json<ApiResponse<SendNotificationResultDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    tracing::info!(
        "Admin {} sending notification to {} user(s)",
        admin.sub,
        dto.user_ids.len()
    );

    let result = service.send(dto).await?;
    let message = format!(
        "{} sent, {} failed, {} skipped",
        result.sent, result.failed, result.skipped
    );

    Ok(Json(ApiResponse::success(Some(result), Some(message), None)))
}

/// List own notification history, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Notifications retrieved", body = ApiResponse<Vec<NotificationResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationResponseDto>>>> {
    let (items, total) = service
        .list_for_user(&user.sub, params.offset(), params.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}
