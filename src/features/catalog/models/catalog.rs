use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::money::Money;

/// Database model for a catalog service
#[derive(Debug, Clone, FromRow)]
pub struct CatalogItem {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category: String,
    pub base_price_cents: Money,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "suggestion_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Approved,
    Rejected,
}

/// Database model for an agent's catalog proposal
#[derive(Debug, Clone, FromRow)]
pub struct ServiceSuggestion {
    pub id: Uuid,
    pub agent_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub suggested_price_cents: Money,
    pub duration_minutes: i32,
    pub status: SuggestionStatus,
    pub review_notes: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub catalog_item_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derive a URL slug from a display name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::SLUG_REGEX;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Deep Cleaning"), "deep-cleaning");
        assert_eq!(slugify("  AC -- Repair & Service! "), "ac-repair-service");
        assert_eq!(slugify("Plumbing"), "plumbing");
    }

    #[test]
    fn test_slugify_output_is_valid_slug() {
        for name in ["Lawn Mowing (large)", "TV wall-mount", "x"] {
            assert!(SLUG_REGEX.is_match(&slugify(name)), "{}", name);
        }
    }
}
