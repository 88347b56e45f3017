use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireAdmin, RequireAgent};
use crate::features::catalog::dtos::*;
use crate::features::catalog::services::CatalogService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

// =============================================================================
// PUBLIC
// =============================================================================

/// List active services
#[utoipa::path(
    get,
    path = "/api/services",
    params(CatalogQueryParams),
    responses(
        (status = 200, description = "Services retrieved", body = ApiResponse<Vec<CatalogItemResponseDto>>)
    ),
    tag = "catalog"
)]
pub async fn list_services(
    State(service): State<Arc<CatalogService>>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<Json<ApiResponse<Vec<CatalogItemResponseDto>>>> {
    let items = service.list_active(params.category.as_deref()).await?;
    let total = items.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get an active service by slug
#[utoipa::path(
    get,
    path = "/api/services/{slug}",
    params(("slug" = String, Path, description = "Service slug")),
    responses(
        (status = 200, description = "Service retrieved", body = ApiResponse<CatalogItemResponseDto>),
        (status = 404, description = "Service not found")
    ),
    tag = "catalog"
)]
pub async fn get_service(
    State(service): State<Arc<CatalogService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<CatalogItemResponseDto>>> {
    let item = service.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(item), None, None)))
}

// =============================================================================
// AGENT SUGGESTIONS
// =============================================================================

/// Propose a new catalog service
#[utoipa::path(
    post,
    path = "/api/agent/suggestions",
    request_body = CreateSuggestionDto,
    responses(
        (status = 201, description = "Suggestion submitted", body = ApiResponse<SuggestionResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Agent access required")
    ),
    tag = "catalog",
    security(("bearer_auth" = []))
)]
pub async fn create_suggestion(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<CatalogService>>,
    AppJson(dto): AppJson<CreateSuggestionDto>,
) -> Result<(StatusCode, Json<ApiResponse<SuggestionResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let suggestion = service.create_suggestion(&user.sub, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(suggestion),
            Some("Suggestion submitted for review".to_string()),
            None,
        )),
    ))
}

/// List own suggestions
#[utoipa::path(
    get,
    path = "/api/agent/suggestions",
    responses(
        (status = 200, description = "Suggestions retrieved", body = ApiResponse<Vec<SuggestionResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Agent access required")
    ),
    tag = "catalog",
    security(("bearer_auth" = []))
)]
pub async fn list_my_suggestions(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<CatalogService>>,
) -> Result<Json<ApiResponse<Vec<SuggestionResponseDto>>>> {
    let items = service.list_suggestions_for_agent(&user.sub).await?;
    Ok(Json(ApiResponse::success(Some(items), None, None)))
}

// =============================================================================
// ADMIN
// =============================================================================

/// List all catalog services including inactive ones
#[utoipa::path(
    get,
    path = "/api/admin/services",
    responses(
        (status = 200, description = "Services retrieved", body = ApiResponse<Vec<CatalogItemResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn admin_list_services(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CatalogService>>,
) -> Result<Json<ApiResponse<Vec<CatalogItemResponseDto>>>> {
    let items = service.list_all().await?;
    Ok(Json(ApiResponse::success(Some(items), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/admin/services",
    request_body = CreateCatalogItemDto,
    responses(
        (status = 201, description = "Service created", body = ApiResponse<CatalogItemResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Slug already in use")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn admin_create_service(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CatalogService>>,
    AppJson(dto): AppJson<CreateCatalogItemDto>,
) -> Result<(StatusCode, Json<ApiResponse<CatalogItemResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let item = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(item), None, None)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/services/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = UpdateCatalogItemDto,
    responses(
        (status = 200, description = "Service updated", body = ApiResponse<CatalogItemResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Service not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn admin_update_service(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCatalogItemDto>,
) -> Result<Json<ApiResponse<CatalogItemResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let item = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(item),
        Some("Service updated successfully".to_string()),
        None,
    )))
}

/// Deactivate a service so it can no longer be booked
#[utoipa::path(
    delete,
    path = "/api/admin/services/{id}",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service deactivated"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Service not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn admin_deactivate_service(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.deactivate(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Service deactivated".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/suggestions",
    params(SuggestionQueryParams, PaginationQuery),
    responses(
        (status = 200, description = "Suggestions retrieved", body = ApiResponse<Vec<SuggestionResponseDto>>),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn admin_list_suggestions(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CatalogService>>,
    Query(filter): Query<SuggestionQueryParams>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<SuggestionResponseDto>>>> {
    let (items, total) = service
        .list_suggestions(filter.status, page.offset(), page.limit())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Approve a suggestion and publish it to the catalog
#[utoipa::path(
    post,
    path = "/api/admin/suggestions/{id}/approve",
    params(("id" = Uuid, Path, description = "Suggestion ID")),
    request_body = ReviewSuggestionDto,
    responses(
        (status = 200, description = "Suggestion approved", body = ApiResponse<SuggestionResponseDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Suggestion not found"),
        (status = 409, description = "Already reviewed or slug in use")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn admin_approve_suggestion(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ReviewSuggestionDto>,
) -> Result<Json<ApiResponse<SuggestionResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let suggestion = service.approve_suggestion(id, &admin.sub, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(suggestion),
        Some("Suggestion approved".to_string()),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/suggestions/{id}/reject",
    params(("id" = Uuid, Path, description = "Suggestion ID")),
    request_body = ReviewSuggestionDto,
    responses(
        (status = 200, description = "Suggestion rejected", body = ApiResponse<SuggestionResponseDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Suggestion not found"),
        (status = 409, description = "Already reviewed")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn admin_reject_suggestion(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<CatalogService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ReviewSuggestionDto>,
) -> Result<Json<ApiResponse<SuggestionResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let suggestion = service.reject_suggestion(id, &admin.sub, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(suggestion),
        Some("Suggestion rejected".to_string()),
        None,
    )))
}
