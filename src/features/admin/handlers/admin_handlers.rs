use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::admin::dtos::*;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::features::bookings::dtos::{BookingDetailDto, BookingResponseDto};
use crate::features::profiles::dtos::AgentProfileResponseDto;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List all bookings (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    params(PaginationQuery, AdminBookingQueryParams),
    responses(
        (status = 200, description = "List of bookings", body = ApiResponse<Vec<BookingResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn list_bookings(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Query(page): Query<PaginationQuery>,
    Query(params): Query<AdminBookingQueryParams>,
) -> Result<Json<ApiResponse<Vec<BookingResponseDto>>>> {
    let (items, total) = service
        .list_bookings(params.status, page.offset(), page.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking detail", body = ApiResponse<BookingDetailDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Booking not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn get_booking(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    let booking = service.get_booking(id).await?;
    Ok(Json(ApiResponse::success(Some(booking), None, None)))
}

/// Confirm a pending booking
#[utoipa::path(
    post,
    path = "/api/admin/bookings/{id}/confirm",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking confirmed", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Invalid lifecycle transition"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Booking not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn confirm_booking(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    let booking = service.confirm(&admin.sub, id).await?;
    Ok(Json(ApiResponse::success(
        Some(booking),
        Some("Booking confirmed".to_string()),
        None,
    )))
}

/// Assign an agent to a booking
#[utoipa::path(
    post,
    path = "/api/admin/bookings/{id}/assign",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = AssignAgentDto,
    responses(
        (status = 200, description = "Agent assigned", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Agent inactive or invalid lifecycle transition"),
        (status = 409, description = "Booking already has an agent"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Booking not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn assign_agent(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AssignAgentDto>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let booking = service.assign_agent(&admin.sub, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(booking),
        Some("Agent assigned".to_string()),
        None,
    )))
}

/// Accept the proof-of-work photos
#[utoipa::path(
    post,
    path = "/api/admin/bookings/{id}/verify",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Work verified", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Invalid lifecycle transition"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Booking not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn verify_booking(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    let booking = service.verify(&admin.sub, id).await?;
    Ok(Json(ApiResponse::success(
        Some(booking),
        Some("Work verified".to_string()),
        None,
    )))
}

/// Send the job back to the agent
#[utoipa::path(
    post,
    path = "/api/admin/bookings/{id}/reject-proof",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = RejectProofDto,
    responses(
        (status = 200, description = "Proof rejected", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Invalid lifecycle transition"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Booking not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn reject_proof(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<RejectProofDto>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let booking = service.reject_proof(&admin.sub, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(booking),
        Some("Proof rejected".to_string()),
        None,
    )))
}

/// Charge the client's card on file
#[utoipa::path(
    post,
    path = "/api/admin/bookings/{id}/charge",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Charge submitted", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "No card on file, card declined or invalid lifecycle transition"),
        (status = 409, description = "Booking is already paid"),
        (status = 502, description = "Payments provider error"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Booking not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn charge_booking(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    let booking = service.charge(&admin.sub, id).await?;
    Ok(Json(ApiResponse::success(
        Some(booking),
        Some("Charge submitted".to_string()),
        None,
    )))
}

/// Close a verified or paid booking
#[utoipa::path(
    post,
    path = "/api/admin/bookings/{id}/complete",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking completed", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Invalid lifecycle transition"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Booking not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn complete_booking(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    let booking = service.complete(&admin.sub, id).await?;
    Ok(Json(ApiResponse::success(
        Some(booking),
        Some("Booking completed".to_string()),
        None,
    )))
}

/// Cancel a booking without a fee
#[utoipa::path(
    post,
    path = "/api/admin/bookings/{id}/cancel",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = AdminCancelBookingDto,
    responses(
        (status = 200, description = "Booking cancelled", body = ApiResponse<BookingDetailDto>),
        (status = 400, description = "Invalid lifecycle transition"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Booking not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn cancel_booking(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AdminCancelBookingDto>,
) -> Result<Json<ApiResponse<BookingDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let booking = service.cancel(&admin.sub, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(booking),
        Some("Booking cancelled".to_string()),
        None,
    )))
}

/// List agents (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/agents",
    params(PaginationQuery, AdminAgentQueryParams),
    responses(
        (status = 200, description = "List of agents", body = ApiResponse<Vec<AdminAgentDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn list_agents(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Query(page): Query<PaginationQuery>,
    Query(params): Query<AdminAgentQueryParams>,
) -> Result<Json<ApiResponse<Vec<AdminAgentDto>>>> {
    let (items, total) = service
        .list_agents(&params, page.offset(), page.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    put,
    path = "/api/admin/agents/{id}/tier",
    params(("id" = String, Path, description = "Agent user ID")),
    request_body = SetAgentTierDto,
    responses(
        (status = 200, description = "Tier updated", body = ApiResponse<AgentProfileResponseDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Agent not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn set_agent_tier(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<SetAgentTierDto>,
) -> Result<Json<ApiResponse<AgentProfileResponseDto>>> {
    let agent = service.set_agent_tier(&id, dto.tier).await?;
    Ok(Json(ApiResponse::success(
        Some(agent),
        Some("Tier updated".to_string()),
        None,
    )))
}

/// Activate or deactivate an agent
#[utoipa::path(
    put,
    path = "/api/admin/agents/{id}/active",
    params(("id" = String, Path, description = "Agent user ID")),
    request_body = SetAgentActiveDto,
    responses(
        (status = 200, description = "Agent updated", body = ApiResponse<AgentProfileResponseDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Agent not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn set_agent_active(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<SetAgentActiveDto>,
) -> Result<Json<ApiResponse<AgentProfileResponseDto>>> {
    let agent = service.set_agent_active(&id, dto.is_active).await?;
    let message = if dto.is_active {
        "Agent activated"
    } else {
        "Agent deactivated"
    };
    Ok(Json(ApiResponse::success(
        Some(agent),
        Some(message.to_string()),
        None,
    )))
}

/// Headline numbers for the admin dashboard
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Dashboard stats", body = ApiResponse<DashboardStatsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn dashboard_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<DashboardStatsDto>>> {
    let stats = service.dashboard_stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
