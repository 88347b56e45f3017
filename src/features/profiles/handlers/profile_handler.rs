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
use crate::features::auth::guards::RequireAgent;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::profiles::dtos::*;
use crate::features::profiles::services::ProfileService;
use crate::shared::types::ApiResponse;

/// Get own profile (created from token claims on first access)
#[utoipa::path(
    get,
    path = "/api/profile/me",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profile",
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
) -> Result<Json<ApiResponse<ProfileResponseDto>>> {
    let profile = service.get_me(&user).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/profile/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<ProfileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profile",
    security(("bearer_auth" = []))
)]
pub async fn update_me(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
    AppJson(dto): AppJson<UpdateProfileDto>,
) -> Result<Json<ApiResponse<ProfileResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = service.update_me(&user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(profile),
        Some("Profile updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/profile/agent",
    responses(
        (status = 200, description = "Agent profile retrieved", body = ApiResponse<AgentProfileResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Agent access required"),
        (status = 404, description = "Agent profile not found")
    ),
    tag = "profile",
    security(("bearer_auth" = []))
)]
pub async fn get_agent_profile(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<ProfileService>>,
) -> Result<Json<ApiResponse<AgentProfileResponseDto>>> {
    let agent = service.get_agent_profile(&user).await?;
    Ok(Json(ApiResponse::success(Some(agent), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/profile/agent",
    request_body = UpdateAgentProfileDto,
    responses(
        (status = 200, description = "Agent profile updated", body = ApiResponse<AgentProfileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Agent access required")
    ),
    tag = "profile",
    security(("bearer_auth" = []))
)]
pub async fn update_agent_profile(
    RequireAgent(user): RequireAgent,
    State(service): State<Arc<ProfileService>>,
    AppJson(dto): AppJson<UpdateAgentProfileDto>,
) -> Result<Json<ApiResponse<AgentProfileResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let agent = service.update_agent_profile(&user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(agent),
        Some("Agent profile updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/profile/addresses",
    responses(
        (status = 200, description = "Own addresses, default first", body = ApiResponse<Vec<AddressResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profile",
    security(("bearer_auth" = []))
)]
pub async fn list_addresses(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
) -> Result<Json<ApiResponse<Vec<AddressResponseDto>>>> {
    let addresses = service.list_addresses(&user.sub).await?;
    Ok(Json(ApiResponse::success(Some(addresses), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/profile/addresses",
    request_body = CreateAddressDto,
    responses(
        (status = 201, description = "Address created", body = ApiResponse<AddressResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profile",
    security(("bearer_auth" = []))
)]
pub async fn create_address(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
    AppJson(dto): AppJson<CreateAddressDto>,
) -> Result<(StatusCode, Json<ApiResponse<AddressResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let address = service.create_address(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(address), None, None)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/profile/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address ID")),
    request_body = UpdateAddressDto,
    responses(
        (status = 200, description = "Address updated", body = ApiResponse<AddressResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Address not found")
    ),
    tag = "profile",
    security(("bearer_auth" = []))
)]
pub async fn update_address(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateAddressDto>,
) -> Result<Json<ApiResponse<AddressResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let address = service.update_address(&user.sub, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(address), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/profile/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address deleted"),
        (status = 404, description = "Address not found")
    ),
    tag = "profile",
    security(("bearer_auth" = []))
)]
pub async fn delete_address(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_address(&user.sub, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Address deleted".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/profile/notification-preferences",
    responses(
        (status = 200, description = "Notification preferences", body = ApiResponse<NotificationPreferencesDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profile",
    security(("bearer_auth" = []))
)]
pub async fn get_notification_preferences(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
) -> Result<Json<ApiResponse<NotificationPreferencesDto>>> {
    let prefs = service.preferences_for(&user.sub).await?;
    Ok(Json(ApiResponse::success(Some(prefs.into()), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/profile/notification-preferences",
    request_body = UpdateNotificationPreferencesDto,
    responses(
        (status = 200, description = "Notification preferences updated", body = ApiResponse<NotificationPreferencesDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profile",
    security(("bearer_auth" = []))
)]
pub async fn update_notification_preferences(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
    AppJson(dto): AppJson<UpdateNotificationPreferencesDto>,
) -> Result<Json<ApiResponse<NotificationPreferencesDto>>> {
    let prefs = service.update_preferences(&user, dto).await?;
    Ok(Json(ApiResponse::success(Some(prefs), None, None)))
}
