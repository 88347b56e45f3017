use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::profiles::models::{
    Address, AgentProfile, AgentTier, NotificationPreferences, Profile, UserRole,
};

/// Response DTO for a user profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponseDto {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: UserRole,
    /// Whether a card is stored for off-session charges
    pub has_card_on_file: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponseDto {
    fn from(p: Profile) -> Self {
        let has_card_on_file = p.card_on_file().is_some();
        Self {
            id: p.id,
            full_name: p.full_name,
            email: p.email,
            phone: p.phone,
            role: p.role,
            has_card_on_file,
            created_at: p.created_at,
        }
    }
}

/// Request DTO for updating own profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub full_name: Option<String>,

    /// Phone in E.164 format, used for SMS notifications
    #[validate(regex(
        path = *crate::shared::validation::PHONE_REGEX,
        message = "Phone must be in E.164 format, e.g. +14155550123"
    ))]
    pub phone: Option<String>,
}

/// Response DTO for agent profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfileResponseDto {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub service_types: Vec<String>,
    pub tier: AgentTier,
    pub is_active: bool,
    pub is_available: bool,
    #[schema(value_type = String, example = "4.75")]
    pub rating_average: Decimal,
    pub rating_count: i32,
    pub completed_jobs: i32,
    pub created_at: DateTime<Utc>,
}

impl From<AgentProfile> for AgentProfileResponseDto {
    fn from(a: AgentProfile) -> Self {
        Self {
            user_id: a.user_id,
            bio: a.bio,
            service_types: a.service_types,
            tier: a.tier,
            is_active: a.is_active,
            is_available: a.is_available,
            rating_average: a.rating_average,
            rating_count: a.rating_count,
            completed_jobs: a.completed_jobs,
            created_at: a.created_at,
        }
    }
}

/// Request DTO for updating own agent profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentProfileDto {
    #[validate(length(max = 2000, message = "Bio must not exceed 2000 characters"))]
    pub bio: Option<String>,

    /// Catalog categories the agent works in
    #[validate(length(max = 20, message = "At most 20 service types"))]
    pub service_types: Option<Vec<String>>,

    pub is_available: Option<bool>,
}

/// Response DTO for address
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponseDto {
    pub id: Uuid,
    pub label: String,
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Address> for AddressResponseDto {
    fn from(a: Address) -> Self {
        Self {
            id: a.id,
            label: a.label,
            line1: a.line1,
            line2: a.line2,
            city: a.city,
            postal_code: a.postal_code,
            is_default: a.is_default,
            created_at: a.created_at,
        }
    }
}

/// Request DTO for creating an address
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressDto {
    #[validate(length(min = 1, max = 64, message = "Label must be 1-64 characters"))]
    pub label: String,

    #[validate(length(min = 1, max = 255, message = "Address line must be 1-255 characters"))]
    pub line1: String,

    #[validate(length(max = 255, message = "Address line must not exceed 255 characters"))]
    pub line2: Option<String>,

    #[validate(length(min = 1, max = 128, message = "City must be 1-128 characters"))]
    pub city: String,

    #[validate(length(max = 16, message = "Postal code must not exceed 16 characters"))]
    pub postal_code: Option<String>,

    /// Make this the default address (the first address always is)
    #[serde(default)]
    pub is_default: bool,
}

/// Request DTO for updating an address
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressDto {
    #[validate(length(min = 1, max = 64, message = "Label must be 1-64 characters"))]
    pub label: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Address line must be 1-255 characters"))]
    pub line1: Option<String>,

    #[validate(length(max = 255, message = "Address line must not exceed 255 characters"))]
    pub line2: Option<String>,

    #[validate(length(min = 1, max = 128, message = "City must be 1-128 characters"))]
    pub city: Option<String>,

    #[validate(length(max = 16, message = "Postal code must not exceed 16 characters"))]
    pub postal_code: Option<String>,

    pub is_default: Option<bool>,
}

/// Response DTO for notification preferences
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferencesDto {
    pub sms_enabled: bool,
    pub push_enabled: bool,
    pub booking_updates: bool,
    pub reminders: bool,
    pub marketing: bool,
}

impl From<NotificationPreferences> for NotificationPreferencesDto {
    fn from(p: NotificationPreferences) -> Self {
        Self {
            sms_enabled: p.sms_enabled,
            push_enabled: p.push_enabled,
            booking_updates: p.booking_updates,
            reminders: p.reminders,
            marketing: p.marketing,
        }
    }
}

/// Request DTO for updating notification preferences; omitted fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotificationPreferencesDto {
    pub sms_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
    pub booking_updates: Option<bool>,
    pub reminders: Option<bool>,
    pub marketing: Option<bool>,
}

impl UpdateNotificationPreferencesDto {
    pub fn apply(&self, current: &mut NotificationPreferences) {
        if let Some(v) = self.sms_enabled {
            current.sms_enabled = v;
        }
        if let Some(v) = self.push_enabled {
            current.push_enabled = v;
        }
        if let Some(v) = self.booking_updates {
            current.booking_updates = v;
        }
        if let Some(v) = self.reminders {
            current.reminders = v;
        }
        if let Some(v) = self.marketing {
            current.marketing = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_update_profile_rejects_local_phone_format() {
        let dto = UpdateProfileDto {
            full_name: Some("Rina".to_string()),
            phone: Some("08123456789".to_string()),
        };
        assert!(dto.validate().is_err());

        let dto = UpdateProfileDto {
            full_name: None,
            phone: Some("+628123456789".to_string()),
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_preferences_patch_keeps_omitted_fields() {
        let mut prefs = NotificationPreferences::defaults_for("u1");
        let patch = UpdateNotificationPreferencesDto {
            sms_enabled: Some(false),
            marketing: Some(true),
            ..Default::default()
        };

        patch.apply(&mut prefs);

        assert!(!prefs.sms_enabled);
        assert!(prefs.marketing);
        assert!(prefs.reminders);
        assert!(prefs.booking_updates);
    }

    #[test]
    fn test_create_address_requires_line1() {
        let dto: CreateAddressDto = serde_json::from_value(serde_json::json!({
            "label": "Home",
            "line1": "",
            "city": "Bandung"
        }))
        .unwrap();
        assert!(dto.validate().is_err());
        assert!(!dto.is_default);
    }
}
