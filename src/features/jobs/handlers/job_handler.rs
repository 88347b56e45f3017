use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAgent;
use crate::features::bookings::dtos::BookingDetailDto;
use crate::features::jobs::dtos::*;
use crate::features::jobs::services::JobService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Open bookings waiting for an agent
#[utoipa::path(
    get,
    path = "/api/agent/jobs/available",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Open jobs retrieved", body = ApiResponse<Vec<AgentJobDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Agent access required or agent deactivated")
    ),
    tag = "agent-jobs",
    security(("bearer_auth" = []))
)]
pub async fn list_available_jobs(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<JobService>>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AgentJobDto>>>> {
    let (items, total) = service
        .list_available(&user.sub, page.offset(), page.limit())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Own jobs, active first
#[utoipa::path(
    get,
    path = "/api/agent/jobs",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Jobs retrieved", body = ApiResponse<Vec<AgentJobDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Agent access required or agent deactivated")
    ),
    tag = "agent-jobs",
    security(("bearer_auth" = []))
)]
pub async fn list_my_jobs(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<JobService>>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AgentJobDto>>>> {
    let (items, total) = service
        .list_mine(&user.sub, page.offset(), page.limit())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/agent/jobs/{id}",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Job retrieved", body = ApiResponse<BookingDetailDto>),
        (status = 403, description = "Agent access required"),
        (status = 404, description = "Job not found")
    ),
    tag = "agent-jobs",
    security(("bearer_auth" = []))
)]
pub async fn get_job(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    let job = service.get(&user.sub, id).await?;
    Ok(Json(ApiResponse::success(Some(job), None, None)))
}

/// Accept an open booking
#[utoipa::path(
    post,
    path = "/api/agent/requests/{id}/accept",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Job accepted", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Booking cannot be assigned in its current status"),
        (status = 403, description = "Agent access required, deactivated or unavailable"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Job already taken")
    ),
    tag = "agent-jobs",
    security(("bearer_auth" = []))
)]
pub async fn accept_job(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    let job = service.accept(&user.sub, id).await?;
    Ok(Json(ApiResponse::success(
        Some(job),
        Some("Job accepted".to_string()),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/agent/jobs/{id}/checkin",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Checked in", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Invalid lifecycle transition"),
        (status = 404, description = "Job not found")
    ),
    tag = "agent-jobs",
    security(("bearer_auth" = []))
)]
pub async fn check_in(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    let job = service.check_in(&user.sub, id).await?;
    Ok(Json(ApiResponse::success(
        Some(job),
        Some("Checked in".to_string()),
        None,
    )))
}

/// Upload a before or after photo
///
/// Accepts multipart/form-data with:
/// - `kind`: "before" or "after"
/// - `file`: the image
#[utoipa::path(
    post,
    path = "/api/agent/jobs/{id}/proof",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body(
        content = UploadProofDto,
        content_type = "multipart/form-data",
        description = "Proof-of-work photo",
    ),
    responses(
        (status = 200, description = "Photo stored", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Invalid file, kind or lifecycle state"),
        (status = 404, description = "Job not found")
    ),
    tag = "agent-jobs",
    security(("bearer_auth" = []))
)]
pub async fn upload_proof(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    let mut kind: Option<ProofKind> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "kind" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read kind field: {}", e))
                })?;
                kind = Some(ProofKind::parse(&text)?);
            }
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file = Some((content_type, data.to_vec()));
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let kind = kind.ok_or_else(|| AppError::BadRequest("Proof kind is required".to_string()))?;
    let (content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let upload = ProofUpload::new(kind, &content_type, data)?;

    let job = service.upload_proof(&user.sub, id, upload).await?;
    Ok(Json(ApiResponse::success(
        Some(job),
        Some(format!("{} photo uploaded", kind.as_str())),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/agent/jobs/{id}/checkout",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Checked out, awaiting verification", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Photos missing or invalid lifecycle transition"),
        (status = 404, description = "Job not found")
    ),
    tag = "agent-jobs",
    security(("bearer_auth" = []))
)]
pub async fn check_out(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    let job = service.check_out(&user.sub, id).await?;
    Ok(Json(ApiResponse::success(
        Some(job),
        Some("Checked out, awaiting verification".to_string()),
        None,
    )))
}

/// Withdraw from an assigned job before checking in
#[utoipa::path(
    post,
    path = "/api/agent/jobs/{id}/cancel",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = WithdrawJobDto,
    responses(
        (status = 200, description = "Withdrawn from job", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Job can no longer be withdrawn"),
        (status = 404, description = "Job not found")
    ),
    tag = "agent-jobs",
    security(("bearer_auth" = []))
)]
pub async fn withdraw_job(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<WithdrawJobDto>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let job = service.withdraw(&user.sub, id, dto.reason).await?;
    Ok(Json(ApiResponse::success(
        Some(job),
        Some("Withdrawn from job".to_string()),
        None,
    )))
}
