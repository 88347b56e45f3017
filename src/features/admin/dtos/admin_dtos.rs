use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::bookings::policies::BookingStatus;
use crate::features::profiles::models::AgentTier;
use crate::shared::money::Money;

// ============================================================================
// Bookings
// ============================================================================

/// Query params for the admin booking list
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AdminBookingQueryParams {
    /// Filter by status
    pub status: Option<BookingStatus>,
}

/// Request DTO for assigning an agent to a booking
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignAgentDto {
    #[validate(length(min = 1, max = 255, message = "Agent id is required"))]
    pub agent_id: String,
}

/// Request DTO for sending a job back to the agent
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectProofDto {
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

/// Request DTO for cancelling a booking on behalf of the client
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminCancelBookingDto {
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

// ============================================================================
// Agents
// ============================================================================

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AdminAgentQueryParams {
    /// Filter by active flag
    pub is_active: Option<bool>,
    pub tier: Option<AgentTier>,
}

/// Agent with the contact details of their profile
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminAgentDto {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub tier: AgentTier,
    pub is_active: bool,
    pub is_available: bool,
    #[schema(value_type = String, example = "4.75")]
    pub rating_average: Decimal,
    pub rating_count: i32,
    pub completed_jobs: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetAgentTierDto {
    pub tier: AgentTier,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetAgentActiveDto {
    pub is_active: bool,
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountDto {
    pub status: BookingStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsDto {
    pub total_bookings: i64,
    pub bookings_by_status: Vec<StatusCountDto>,
    /// Collected payments net of refunds, plus collected cancellation fees
    pub revenue_cents: Money,
    pub active_agents: i64,
    /// Average client rating across all agents, absent before the first rating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_requires_agent_id() {
        let dto = AssignAgentDto {
            agent_id: String::new(),
        };
        assert!(dto.validate().is_err());

        let dto: AssignAgentDto =
            serde_json::from_value(serde_json::json!({ "agentId": "agent-1" })).unwrap();
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_tier_deserializes_lowercase() {
        let dto: SetAgentTierDto =
            serde_json::from_value(serde_json::json!({ "tier": "gold" })).unwrap();
        assert_eq!(dto.tier, AgentTier::Gold);

        assert!(serde_json::from_value::<SetAgentTierDto>(serde_json::json!({ "tier": "diamond" }))
            .is_err());
    }

    #[test]
    fn test_stats_skip_missing_rating() {
        let stats = DashboardStatsDto {
            total_bookings: 0,
            bookings_by_status: Vec::new(),
            revenue_cents: Money::ZERO,
            active_agents: 0,
            average_rating: None,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("averageRating").is_none());
        assert_eq!(json["revenueCents"], 0);
    }
}
