use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireAgent, RequireClient};
use crate::features::ratings::dtos::{CreateRatingDto, RatingResponseDto};
use crate::features::ratings::services::RatingService;
use crate::shared::types::ApiResponse;

/// Rate the agent of a completed booking
#[utoipa::path(
    post,
    path = "/api/requests/{id}/rate",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = CreateRatingDto,
    responses(
        (status = 201, description = "Rating recorded", body = ApiResponse<RatingResponseDto>),
        (status = 400, description = "Booking is not completed or score out of range"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Already rated")
    ),
    tag = "ratings",
    security(("bearer_auth" = []))
)]
pub async fn rate_agent(
    RequireClient(user): RequireClient,
    State(service): State<Arc<RatingService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateRatingDto>,
) -> Result<(StatusCode, Json<ApiResponse<RatingResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let rating = service.rate_agent(&user.sub, id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(rating),
            Some("Thanks for your rating".to_string()),
            None,
        )),
    ))
}

/// Rate the client of a completed job
#[utoipa::path(
    post,
    path = "/api/agent/jobs/{id}/rate",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = CreateRatingDto,
    responses(
        (status = 201, description = "Rating recorded", body = ApiResponse<RatingResponseDto>),
        (status = 400, description = "Job is not completed or score out of range"),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Already rated")
    ),
    tag = "ratings",
    security(("bearer_auth" = []))
)]
pub async fn rate_client(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<RatingService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateRatingDto>,
) -> Result<(StatusCode, Json<ApiResponse<RatingResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let rating = service.rate_client(&user.sub, id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(rating),
            Some("Rating recorded".to_string()),
            None,
        )),
    ))
}
