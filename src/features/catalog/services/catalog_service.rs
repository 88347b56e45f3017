use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::catalog::dtos::*;
use crate::features::catalog::models::*;
use crate::shared::money::Money;

const CATALOG_COLUMNS: &str = "id, name, slug, description, category, base_price_cents, \
     duration_minutes, is_active, created_at, updated_at";

const SUGGESTION_COLUMNS: &str = "id, agent_id, name, description, category, suggested_price_cents, \
     duration_minutes, status, review_notes, reviewed_by, reviewed_at, catalog_item_id, \
     created_at, updated_at";

/// Service for the service catalog and agent suggestions
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // CATALOG
    // =========================================================================

    /// List active services, optionally filtered by category
    pub async fn list_active(&self, category: Option<&str>) -> Result<Vec<CatalogItemResponseDto>> {
        let services = sqlx::query_as::<_, CatalogItem>(&format!(
            r#"
            SELECT {CATALOG_COLUMNS}
            FROM service_catalog
            WHERE is_active = TRUE
              AND ($1::TEXT IS NULL OR category = $1)
            ORDER BY category, name
            "#
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list catalog services: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(services.into_iter().map(Into::into).collect())
    }

    /// List every service including inactive ones (admin)
    pub async fn list_all(&self) -> Result<Vec<CatalogItemResponseDto>> {
        let services = sqlx::query_as::<_, CatalogItem>(&format!(
            "SELECT {CATALOG_COLUMNS} FROM service_catalog ORDER BY is_active DESC, category, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(services.into_iter().map(Into::into).collect())
    }

    /// Get an active service by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<CatalogItemResponseDto> {
        let service = sqlx::query_as::<_, CatalogItem>(&format!(
            "SELECT {CATALOG_COLUMNS} FROM service_catalog WHERE slug = $1 AND is_active = TRUE"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get catalog service by slug: {:?}", e);
            AppError::Database(e)
        })?;

        service
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Service '{}' not found", slug)))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CatalogItem>> {
        let service = sqlx::query_as::<_, CatalogItem>(&format!(
            "SELECT {CATALOG_COLUMNS} FROM service_catalog WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(service)
    }

    pub async fn create(&self, dto: CreateCatalogItemDto) -> Result<CatalogItemResponseDto> {
        let slug = dto.slug.clone().unwrap_or_else(|| slugify(&dto.name));
        if slug.is_empty() {
            return Err(AppError::Validation(
                "Name must contain letters or digits".to_string(),
            ));
        }

        let service = sqlx::query_as::<_, CatalogItem>(&format!(
            r#"
            INSERT INTO service_catalog
                (name, slug, description, category, base_price_cents, duration_minutes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CATALOG_COLUMNS}
            "#
        ))
        .bind(dto.name.trim())
        .bind(&slug)
        .bind(&dto.description)
        .bind(dto.category.trim().to_lowercase())
        .bind(Money::from_cents(dto.base_price_cents))
        .bind(dto.duration_minutes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| slug_conflict(e, &slug))?;

        tracing::info!("Catalog service created: {} ({})", service.slug, service.id);
        Ok(service.into())
    }

    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateCatalogItemDto,
    ) -> Result<CatalogItemResponseDto> {
        let service = sqlx::query_as::<_, CatalogItem>(&format!(
            r#"
            UPDATE service_catalog SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                base_price_cents = COALESCE($5, base_price_cents),
                duration_minutes = COALESCE($6, duration_minutes),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CATALOG_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(&dto.description)
        .bind(dto.category.map(|c| c.trim().to_lowercase()))
        .bind(dto.base_price_cents)
        .bind(dto.duration_minutes)
        .bind(dto.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

        tracing::info!("Catalog service updated: {}", service.id);
        Ok(service.into())
    }

    /// Hide a service from the catalog. Existing bookings keep their price.
    pub async fn deactivate(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE service_catalog SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Service not found".to_string()));
        }

        tracing::info!("Catalog service deactivated: {}", id);
        Ok(())
    }

    // =========================================================================
    // SUGGESTIONS
    // =========================================================================

    pub async fn create_suggestion(
        &self,
        agent_id: &str,
        dto: CreateSuggestionDto,
    ) -> Result<SuggestionResponseDto> {
        let suggestion = sqlx::query_as::<_, ServiceSuggestion>(&format!(
            r#"
            INSERT INTO service_suggestions
                (agent_id, name, description, category, suggested_price_cents, duration_minutes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SUGGESTION_COLUMNS}
            "#
        ))
        .bind(agent_id)
        .bind(dto.name.trim())
        .bind(&dto.description)
        .bind(dto.category.trim().to_lowercase())
        .bind(Money::from_cents(dto.suggested_price_cents))
        .bind(dto.duration_minutes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create suggestion: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Agent {} suggested service '{}'", agent_id, suggestion.name);
        Ok(suggestion.into())
    }

    pub async fn list_suggestions_for_agent(
        &self,
        agent_id: &str,
    ) -> Result<Vec<SuggestionResponseDto>> {
        let rows = sqlx::query_as::<_, ServiceSuggestion>(&format!(
            "SELECT {SUGGESTION_COLUMNS} FROM service_suggestions \
             WHERE agent_id = $1 ORDER BY created_at DESC"
        ))
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_suggestions(
        &self,
        status: Option<SuggestionStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<SuggestionResponseDto>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM service_suggestions \
             WHERE ($1::suggestion_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ServiceSuggestion>(&format!(
            r#"
            SELECT {SUGGESTION_COLUMNS}
            FROM service_suggestions
            WHERE ($1::suggestion_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#
        ))
        .bind(status)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Approve a pending suggestion, creating the catalog entry in the same transaction
    pub async fn approve_suggestion(
        &self,
        id: Uuid,
        admin_id: &str,
        dto: ReviewSuggestionDto,
    ) -> Result<SuggestionResponseDto> {
        let mut tx = self.pool.begin().await?;

        let suggestion = lock_pending_suggestion(&mut tx, id).await?;

        let slug = slugify(&suggestion.name);
        let price = dto
            .base_price_cents
            .map(Money::from_cents)
            .unwrap_or(suggestion.suggested_price_cents);

        let catalog_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO service_catalog
                (name, slug, description, category, base_price_cents, duration_minutes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&suggestion.name)
        .bind(&slug)
        .bind(&suggestion.description)
        .bind(&suggestion.category)
        .bind(price)
        .bind(suggestion.duration_minutes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| slug_conflict(e, &slug))?;

        let approved = sqlx::query_as::<_, ServiceSuggestion>(&format!(
            r#"
            UPDATE service_suggestions SET
                status = 'approved',
                review_notes = $2,
                reviewed_by = $3,
                reviewed_at = NOW(),
                catalog_item_id = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SUGGESTION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&dto.notes)
        .bind(admin_id)
        .bind(catalog_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Suggestion {} approved by {}, catalog service {} created",
            id,
            admin_id,
            catalog_id
        );
        Ok(approved.into())
    }

    pub async fn reject_suggestion(
        &self,
        id: Uuid,
        admin_id: &str,
        dto: ReviewSuggestionDto,
    ) -> Result<SuggestionResponseDto> {
        let mut tx = self.pool.begin().await?;

        lock_pending_suggestion(&mut tx, id).await?;

        let rejected = sqlx::query_as::<_, ServiceSuggestion>(&format!(
            r#"
            UPDATE service_suggestions SET
                status = 'rejected',
                review_notes = $2,
                reviewed_by = $3,
                reviewed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SUGGESTION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&dto.notes)
        .bind(admin_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Suggestion {} rejected by {}", id, admin_id);
        Ok(rejected.into())
    }
}

async fn lock_pending_suggestion(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: Uuid,
) -> Result<ServiceSuggestion> {
    let suggestion = sqlx::query_as::<_, ServiceSuggestion>(&format!(
        "SELECT {SUGGESTION_COLUMNS} FROM service_suggestions WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Suggestion not found".to_string()))?;

    if suggestion.status != SuggestionStatus::Pending {
        return Err(AppError::Conflict(
            "Suggestion has already been reviewed".to_string(),
        ));
    }

    Ok(suggestion)
}

fn slug_conflict(err: sqlx::Error, slug: &str) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(format!("A service with slug '{}' already exists", slug))
    } else {
        tracing::error!("Failed to write catalog service: {:?}", err);
        AppError::Database(err)
    }
}
