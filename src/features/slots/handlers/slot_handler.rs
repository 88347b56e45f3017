use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::slots::dtos::*;
use crate::features::slots::services::SlotService;
use crate::shared::types::{ApiResponse, Meta};

/// List slots in a date window
#[utoipa::path(
    get,
    path = "/api/slots",
    params(SlotQueryParams),
    responses(
        (status = 200, description = "Slots retrieved", body = ApiResponse<Vec<SlotResponseDto>>),
        (status = 400, description = "Invalid window")
    ),
    tag = "slots"
)]
pub async fn list_slots(
    State(service): State<Arc<SlotService>>,
    Query(params): Query<SlotQueryParams>,
) -> Result<Json<ApiResponse<Vec<SlotResponseDto>>>> {
    let (from, to) = params.window(Utc::now().date_naive())?;
    let slots = service.list(from, to).await?;
    let total = slots.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(slots),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/slots",
    request_body = CreateSlotDto,
    responses(
        (status = 201, description = "Slot created", body = ApiResponse<SlotResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Slot already exists")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn create_slot(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<SlotService>>,
    AppJson(dto): AppJson<CreateSlotDto>,
) -> Result<(StatusCode, Json<ApiResponse<SlotResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let slot = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(slot), None, None)),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/slots/{id}",
    params(("id" = Uuid, Path, description = "Slot ID")),
    responses(
        (status = 200, description = "Slot deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Slot not found"),
        (status = 409, description = "Slot has bookings")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_slot(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<SlotService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Slot deleted".to_string()),
        None,
    )))
}
