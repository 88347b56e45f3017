use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::catalog::models::{CatalogItem, ServiceSuggestion, SuggestionStatus};
use crate::shared::money::Money;

/// Response DTO for a catalog service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemResponseDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub base_price_cents: Money,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CatalogItem> for CatalogItemResponseDto {
    fn from(s: CatalogItem) -> Self {
        Self {
            id: s.id,
            name: s.name,
            slug: s.slug,
            description: s.description,
            category: s.category,
            base_price_cents: s.base_price_cents,
            duration_minutes: s.duration_minutes,
            is_active: s.is_active,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Query params for the public catalog
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CatalogQueryParams {
    /// Filter by category
    pub category: Option<String>,
}

/// Request DTO for creating a catalog service (admin)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogItemDto {
    #[validate(length(min = 2, max = 120, message = "Name must be 2-120 characters"))]
    pub name: String,

    /// Derived from the name when omitted
    #[validate(regex(path = *crate::shared::validation::SLUG_REGEX, message = "Invalid slug"))]
    pub slug: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(min = 2, max = 60, message = "Category must be 2-60 characters"))]
    pub category: String,

    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub base_price_cents: i64,

    #[validate(range(min = 15, max = 1440, message = "Duration must be 15-1440 minutes"))]
    pub duration_minutes: i32,
}

/// Request DTO for updating a catalog service (admin)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCatalogItemDto {
    #[validate(length(min = 2, max = 120, message = "Name must be 2-120 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(min = 2, max = 60, message = "Category must be 2-60 characters"))]
    pub category: Option<String>,

    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub base_price_cents: Option<i64>,

    #[validate(range(min = 15, max = 1440, message = "Duration must be 15-1440 minutes"))]
    pub duration_minutes: Option<i32>,

    pub is_active: Option<bool>,
}

/// Response DTO for a service suggestion
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponseDto {
    pub id: Uuid,
    pub agent_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub suggested_price_cents: Money,
    pub duration_minutes: i32,
    pub status: SuggestionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_item_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<ServiceSuggestion> for SuggestionResponseDto {
    fn from(s: ServiceSuggestion) -> Self {
        Self {
            id: s.id,
            agent_id: s.agent_id,
            name: s.name,
            description: s.description,
            category: s.category,
            suggested_price_cents: s.suggested_price_cents,
            duration_minutes: s.duration_minutes,
            status: s.status,
            review_notes: s.review_notes,
            reviewed_at: s.reviewed_at,
            catalog_item_id: s.catalog_item_id,
            created_at: s.created_at,
        }
    }
}

/// Request DTO for an agent's catalog proposal
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuggestionDto {
    #[validate(length(min = 2, max = 120, message = "Name must be 2-120 characters"))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(min = 2, max = 60, message = "Category must be 2-60 characters"))]
    pub category: String,

    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub suggested_price_cents: i64,

    #[validate(range(min = 15, max = 1440, message = "Duration must be 15-1440 minutes"))]
    pub duration_minutes: i32,
}

/// Query params for listing suggestions (admin)
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SuggestionQueryParams {
    /// Filter by review status
    pub status: Option<SuggestionStatus>,
}

/// Request DTO for approving or rejecting a suggestion
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSuggestionDto {
    #[validate(length(max = 1000))]
    pub notes: Option<String>,

    /// Overrides the suggested price when approving
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub base_price_cents: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{faker::lorem::en::Words, Fake};

    fn create_dto() -> CreateCatalogItemDto {
        let words: Vec<String> = Words(2..3).fake();
        CreateCatalogItemDto {
            name: words.join(" "),
            slug: None,
            description: None,
            category: "cleaning".to_string(),
            base_price_cents: 8000,
            duration_minutes: 120,
        }
    }

    #[test]
    fn test_create_catalog_service_validation() {
        assert!(create_dto().validate().is_ok());

        let mut bad_slug = create_dto();
        bad_slug.slug = Some("Deep Cleaning".to_string());
        assert!(bad_slug.validate().is_err());

        let mut negative = create_dto();
        negative.base_price_cents = -1;
        assert!(negative.validate().is_err());

        let mut short = create_dto();
        short.duration_minutes = 5;
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_suggestion_validation() {
        let dto = CreateSuggestionDto {
            name: "Gutter cleaning".to_string(),
            description: Some("Clear leaves and debris".to_string()),
            category: "outdoor".to_string(),
            suggested_price_cents: 6000,
            duration_minutes: 90,
        };
        assert!(dto.validate().is_ok());

        let dto = CreateSuggestionDto {
            name: "x".to_string(),
            ..dto
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_review_body_is_optional() {
        let dto: ReviewSuggestionDto = serde_json::from_str("{}").unwrap();
        assert!(dto.notes.is_none());
        assert!(dto.validate().is_ok());
    }
}
