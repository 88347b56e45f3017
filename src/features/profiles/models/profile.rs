use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// User role enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Client,
    Agent,
    Admin,
}

impl UserRole {
    pub fn from_role_name(role: &str) -> Self {
        match role {
            "admin" => UserRole::Admin,
            "agent" => UserRole::Agent,
            _ => UserRole::Client,
        }
    }
}

/// Agent tier enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "agent_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AgentTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// Database model for profile
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub payment_customer_id: Option<String>,
    pub payment_method_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Customer and payment method to charge off-session, when both are stored
    pub fn card_on_file(&self) -> Option<(&str, &str)> {
        match (&self.payment_customer_id, &self.payment_method_id) {
            (Some(customer), Some(method)) => Some((customer.as_str(), method.as_str())),
            _ => None,
        }
    }
}

/// Database model for agent profile
#[derive(Debug, Clone, FromRow)]
pub struct AgentProfile {
    pub user_id: String,
    pub bio: Option<String>,
    pub service_types: Vec<String>,
    pub tier: AgentTier,
    pub is_active: bool,
    pub is_available: bool,
    pub rating_average: Decimal,
    pub rating_count: i32,
    pub completed_jobs: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for address
#[derive(Debug, Clone, FromRow)]
pub struct Address {
    pub id: Uuid,
    pub user_id: String,
    pub label: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for notification preferences
#[derive(Debug, Clone, FromRow)]
pub struct NotificationPreferences {
    pub user_id: String,
    pub sms_enabled: bool,
    pub push_enabled: bool,
    pub booking_updates: bool,
    pub reminders: bool,
    pub marketing: bool,
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreferences {
    /// Preferences of a user who never saved any
    pub fn defaults_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            sms_enabled: true,
            push_enabled: true,
            booking_updates: true,
            reminders: true,
            marketing: false,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(customer: Option<&str>, method: Option<&str>) -> Profile {
        Profile {
            id: "client-1".to_string(),
            full_name: None,
            email: None,
            phone: None,
            role: UserRole::Client,
            payment_customer_id: customer.map(str::to_string),
            payment_method_id: method.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_card_on_file_needs_customer_and_method() {
        assert_eq!(
            profile(Some("cus_1"), Some("pm_1")).card_on_file(),
            Some(("cus_1", "pm_1"))
        );
        assert_eq!(profile(Some("cus_1"), None).card_on_file(), None);
        assert_eq!(profile(None, Some("pm_1")).card_on_file(), None);
    }

    #[test]
    fn test_role_from_name() {
        assert_eq!(UserRole::from_role_name("admin"), UserRole::Admin);
        assert_eq!(UserRole::from_role_name("agent"), UserRole::Agent);
        assert_eq!(UserRole::from_role_name("client"), UserRole::Client);
    }
}
