use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::AuthenticatedUser;
use crate::features::profiles::dtos::ProfileResponseDto;

/// DTO for /auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponseDto {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub roles: Vec<String>,
    /// Stored profile, created on first access
    pub profile: ProfileResponseDto,
}

impl MeResponseDto {
    pub fn new(user: AuthenticatedUser, profile: ProfileResponseDto) -> Self {
        Self {
            sub: user.sub,
            email: user.email,
            roles: user.roles,
            profile,
        }
    }
}
