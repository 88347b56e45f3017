use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::profiles::dtos::*;
use crate::features::profiles::models::{
    Address, AgentProfile, NotificationPreferences, Profile, UserRole,
};

const PROFILE_COLUMNS: &str = "id, full_name, email, phone, role, payment_customer_id, \
     payment_method_id, created_at, updated_at";

const AGENT_COLUMNS: &str = "user_id, bio, service_types, tier, is_active, is_available, \
     rating_average, rating_count, completed_jobs, created_at, updated_at";

const ADDRESS_COLUMNS: &str =
    "id, user_id, label, line1, line2, city, postal_code, is_default, created_at, updated_at";

/// Service for profiles, agent profiles, addresses and notification preferences
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // PROFILE
    // =========================================================================

    /// Load the caller's profile, creating it from token claims on first access
    pub async fn ensure_profile(&self, user: &AuthenticatedUser) -> Result<Profile> {
        let role = UserRole::from_role_name(user.primary_role());

        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (id, email, phone, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                email = COALESCE(profiles.email, EXCLUDED.email),
                phone = COALESCE(profiles.phone, EXCLUDED.phone),
                role = EXCLUDED.role
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(&user.sub)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert profile {}: {:?}", user.sub, e);
            AppError::Database(e)
        })?;

        if role == UserRole::Agent {
            sqlx::query("INSERT INTO agent_profiles (user_id) VALUES ($1) ON CONFLICT DO NOTHING")
                .bind(&user.sub)
                .execute(&self.pool)
                .await?;
        }

        Ok(profile)
    }

    pub async fn find_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn get_me(&self, user: &AuthenticatedUser) -> Result<ProfileResponseDto> {
        Ok(self.ensure_profile(user).await?.into())
    }

    pub async fn update_me(
        &self,
        user: &AuthenticatedUser,
        dto: UpdateProfileDto,
    ) -> Result<ProfileResponseDto> {
        self.ensure_profile(user).await?;

        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(&user.sub)
        .bind(dto.full_name.as_deref().map(str::trim))
        .bind(&dto.phone)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Profile updated: id={}", profile.id);
        Ok(profile.into())
    }

    // =========================================================================
    // AGENT PROFILE
    // =========================================================================

    pub async fn find_agent_profile(&self, user_id: &str) -> Result<Option<AgentProfile>> {
        let agent = sqlx::query_as::<_, AgentProfile>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agent_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(agent)
    }

    /// Stored agent profile of the caller, which must exist and be active
    pub async fn require_active_agent(&self, user_id: &str) -> Result<AgentProfile> {
        let agent = self
            .find_agent_profile(user_id)
            .await?
            .ok_or_else(|| AppError::Forbidden("Agent profile not found".to_string()))?;

        if !agent.is_active {
            return Err(AppError::Forbidden("Agent account is deactivated".to_string()));
        }

        Ok(agent)
    }

    pub async fn get_agent_profile(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<AgentProfileResponseDto> {
        self.ensure_profile(user).await?;

        self.find_agent_profile(&user.sub)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Agent profile not found".to_string()))
    }

    pub async fn update_agent_profile(
        &self,
        user: &AuthenticatedUser,
        dto: UpdateAgentProfileDto,
    ) -> Result<AgentProfileResponseDto> {
        self.ensure_profile(user).await?;

        let agent = sqlx::query_as::<_, AgentProfile>(&format!(
            r#"
            UPDATE agent_profiles SET
                bio = COALESCE($2, bio),
                service_types = COALESCE($3, service_types),
                is_available = COALESCE($4, is_available),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {AGENT_COLUMNS}
            "#
        ))
        .bind(&user.sub)
        .bind(&dto.bio)
        .bind(&dto.service_types)
        .bind(dto.is_available)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Agent profile not found".to_string()))?;

        tracing::info!("Agent profile updated: user_id={}", agent.user_id);
        Ok(agent.into())
    }

    // =========================================================================
    // ADDRESSES
    // =========================================================================

    pub async fn list_addresses(&self, user_id: &str) -> Result<Vec<AddressResponseDto>> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 \
             ORDER BY is_default DESC, created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses.into_iter().map(Into::into).collect())
    }

    /// Address owned by `user_id`, used to validate booking input
    pub async fn find_address(&self, user_id: &str, id: Uuid) -> Result<Option<Address>> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address)
    }

    pub async fn create_address(
        &self,
        user: &AuthenticatedUser,
        dto: CreateAddressDto,
    ) -> Result<AddressResponseDto> {
        self.ensure_profile(user).await?;

        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
            .bind(&user.sub)
            .fetch_one(&mut *tx)
            .await?;

        let is_default = dto.is_default || existing == 0;
        if is_default {
            clear_default_address(&mut tx, &user.sub).await?;
        }

        let address = sqlx::query_as::<_, Address>(&format!(
            r#"
            INSERT INTO addresses (user_id, label, line1, line2, city, postal_code, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(&user.sub)
        .bind(&dto.label)
        .bind(&dto.line1)
        .bind(&dto.line2)
        .bind(&dto.city)
        .bind(&dto.postal_code)
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Address created: id={}, user_id={}", address.id, user.sub);
        Ok(address.into())
    }

    pub async fn update_address(
        &self,
        user_id: &str,
        id: Uuid,
        dto: UpdateAddressDto,
    ) -> Result<AddressResponseDto> {
        let mut tx = self.pool.begin().await?;

        if dto.is_default == Some(true) {
            clear_default_address(&mut tx, user_id).await?;
        }

        let address = sqlx::query_as::<_, Address>(&format!(
            r#"
            UPDATE addresses SET
                label = COALESCE($3, label),
                line1 = COALESCE($4, line1),
                line2 = COALESCE($5, line2),
                city = COALESCE($6, city),
                postal_code = COALESCE($7, postal_code),
                is_default = COALESCE($8, is_default),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&dto.label)
        .bind(&dto.line1)
        .bind(&dto.line2)
        .bind(&dto.city)
        .bind(&dto.postal_code)
        .bind(dto.is_default)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".to_string()))?;

        tx.commit().await?;

        Ok(address.into())
    }

    pub async fn delete_address(&self, user_id: &str, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Address not found".to_string()));
        }

        tracing::info!("Address deleted: id={}, user_id={}", id, user_id);
        Ok(())
    }

    // =========================================================================
    // NOTIFICATION PREFERENCES
    // =========================================================================

    /// Stored preferences, or the defaults when none were saved
    pub async fn preferences_for(&self, user_id: &str) -> Result<NotificationPreferences> {
        let prefs = sqlx::query_as::<_, NotificationPreferences>(
            r#"
            SELECT user_id, sms_enabled, push_enabled, booking_updates, reminders, marketing, updated_at
            FROM notification_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(prefs.unwrap_or_else(|| NotificationPreferences::defaults_for(user_id)))
    }

    pub async fn update_preferences(
        &self,
        user: &AuthenticatedUser,
        dto: UpdateNotificationPreferencesDto,
    ) -> Result<NotificationPreferencesDto> {
        self.ensure_profile(user).await?;

        let mut prefs = self.preferences_for(&user.sub).await?;
        dto.apply(&mut prefs);

        let saved = sqlx::query_as::<_, NotificationPreferences>(
            r#"
            INSERT INTO notification_preferences
                (user_id, sms_enabled, push_enabled, booking_updates, reminders, marketing)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                sms_enabled = EXCLUDED.sms_enabled,
                push_enabled = EXCLUDED.push_enabled,
                booking_updates = EXCLUDED.booking_updates,
                reminders = EXCLUDED.reminders,
                marketing = EXCLUDED.marketing,
                updated_at = NOW()
            RETURNING user_id, sms_enabled, push_enabled, booking_updates, reminders, marketing, updated_at
            "#,
        )
        .bind(&user.sub)
        .bind(prefs.sms_enabled)
        .bind(prefs.push_enabled)
        .bind(prefs.booking_updates)
        .bind(prefs.reminders)
        .bind(prefs.marketing)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved.into())
    }
}

async fn clear_default_address(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: &str,
) -> Result<()> {
    sqlx::query(
        "UPDATE addresses SET is_default = FALSE, updated_at = NOW() \
         WHERE user_id = $1 AND is_default",
    )
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
