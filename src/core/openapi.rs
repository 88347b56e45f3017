use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth;
use crate::features::bookings::{
    dtos as bookings_dtos, handlers as bookings_handlers, models as bookings_models,
    policies as bookings_policies,
};
use crate::features::catalog::{
    dtos as catalog_dtos, handlers as catalog_handlers, models as catalog_models,
};
use crate::features::jobs::{dtos as jobs_dtos, handlers as jobs_handlers};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
    models as notifications_models,
};
use crate::features::payments::{dtos as payments_dtos, handlers as payments_handlers};
use crate::features::profiles::{
    dtos as profiles_dtos, handlers as profiles_handlers, models as profiles_models,
};
use crate::features::ratings::{
    dtos as ratings_dtos, handlers as ratings_handlers, models as ratings_models,
};
use crate::features::slots::{dtos as slots_dtos, handlers as slots_handlers};
use crate::shared::money::Money;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_me,
        // Profiles
        profiles_handlers::get_me,
        profiles_handlers::update_me,
        profiles_handlers::get_agent_profile,
        profiles_handlers::update_agent_profile,
        profiles_handlers::list_addresses,
        profiles_handlers::create_address,
        profiles_handlers::update_address,
        profiles_handlers::delete_address,
        profiles_handlers::get_notification_preferences,
        profiles_handlers::update_notification_preferences,
        // Catalog (public + agent suggestions)
        catalog_handlers::list_services,
        catalog_handlers::get_service,
        catalog_handlers::create_suggestion,
        catalog_handlers::list_my_suggestions,
        // Slots (public)
        slots_handlers::list_slots,
        // Bookings
        bookings_handlers::create_booking,
        bookings_handlers::list_bookings,
        bookings_handlers::get_booking,
        bookings_handlers::get_cancellation_quote,
        bookings_handlers::cancel_booking,
        // Agent jobs
        jobs_handlers::list_available_jobs,
        jobs_handlers::list_my_jobs,
        jobs_handlers::get_job,
        jobs_handlers::accept_job,
        jobs_handlers::check_in,
        jobs_handlers::upload_proof,
        jobs_handlers::check_out,
        jobs_handlers::withdraw_job,
        // Ratings
        ratings_handlers::rate_agent,
        ratings_handlers::rate_client,
        // Notifications
        notifications_handlers::send_notification,
        notifications_handlers::list_notifications,
        // Payments
        payments_handlers::payment_webhook,
        // Admin
        admin_handlers::list_bookings,
        admin_handlers::get_booking,
        admin_handlers::confirm_booking,
        admin_handlers::assign_agent,
        admin_handlers::verify_booking,
        admin_handlers::reject_proof,
        admin_handlers::charge_booking,
        admin_handlers::complete_booking,
        admin_handlers::cancel_booking,
        admin_handlers::list_agents,
        admin_handlers::set_agent_tier,
        admin_handlers::set_agent_active,
        admin_handlers::dashboard_stats,
        catalog_handlers::admin_list_services,
        catalog_handlers::admin_create_service,
        catalog_handlers::admin_update_service,
        catalog_handlers::admin_deactivate_service,
        catalog_handlers::admin_list_suggestions,
        catalog_handlers::admin_approve_suggestion,
        catalog_handlers::admin_reject_suggestion,
        slots_handlers::create_slot,
        slots_handlers::delete_slot,
    ),
    components(
        schemas(
            // Shared
            Meta,
            Money,
            // Auth
            auth::dto::MeResponseDto,
            auth::model::AuthenticatedUser,
            ApiResponse<auth::dto::MeResponseDto>,
            // Profiles
            profiles_models::UserRole,
            profiles_models::AgentTier,
            profiles_dtos::ProfileResponseDto,
            profiles_dtos::UpdateProfileDto,
            profiles_dtos::AgentProfileResponseDto,
            profiles_dtos::UpdateAgentProfileDto,
            profiles_dtos::AddressResponseDto,
            profiles_dtos::CreateAddressDto,
            profiles_dtos::UpdateAddressDto,
            profiles_dtos::NotificationPreferencesDto,
            profiles_dtos::UpdateNotificationPreferencesDto,
            ApiResponse<profiles_dtos::ProfileResponseDto>,
            ApiResponse<profiles_dtos::AgentProfileResponseDto>,
            ApiResponse<profiles_dtos::AddressResponseDto>,
            ApiResponse<Vec<profiles_dtos::AddressResponseDto>>,
            ApiResponse<profiles_dtos::NotificationPreferencesDto>,
            // Catalog
            catalog_models::SuggestionStatus,
            catalog_dtos::CatalogItemResponseDto,
            catalog_dtos::CreateCatalogItemDto,
            catalog_dtos::UpdateCatalogItemDto,
            catalog_dtos::SuggestionResponseDto,
            catalog_dtos::CreateSuggestionDto,
            catalog_dtos::ReviewSuggestionDto,
            ApiResponse<catalog_dtos::CatalogItemResponseDto>,
            ApiResponse<Vec<catalog_dtos::CatalogItemResponseDto>>,
            ApiResponse<catalog_dtos::SuggestionResponseDto>,
            ApiResponse<Vec<catalog_dtos::SuggestionResponseDto>>,
            // Slots
            slots_dtos::SlotResponseDto,
            slots_dtos::CreateSlotDto,
            ApiResponse<slots_dtos::SlotResponseDto>,
            ApiResponse<Vec<slots_dtos::SlotResponseDto>>,
            // Bookings
            bookings_policies::BookingStatus,
            bookings_policies::BookingAction,
            bookings_policies::CancellationQuote,
            bookings_models::PaymentStatus,
            bookings_dtos::CreateBookingDto,
            bookings_dtos::CancelBookingDto,
            bookings_dtos::BookingResponseDto,
            bookings_dtos::AssignmentResponseDto,
            bookings_dtos::BookingEventDto,
            bookings_dtos::BookingDetailDto,
            ApiResponse<bookings_dtos::BookingDetailDto>,
            ApiResponse<Vec<bookings_dtos::BookingResponseDto>>,
            ApiResponse<bookings_policies::CancellationQuote>,
            // Jobs
            jobs_dtos::ProofKind,
            jobs_dtos::UploadProofDto,
            jobs_dtos::WithdrawJobDto,
            jobs_dtos::AgentJobDto,
            ApiResponse<Vec<jobs_dtos::AgentJobDto>>,
            // Ratings
            ratings_models::RaterType,
            ratings_dtos::CreateRatingDto,
            ratings_dtos::RatingResponseDto,
            ApiResponse<ratings_dtos::RatingResponseDto>,
            // Notifications
            notifications_models::NotificationChannel,
            notifications_models::NotificationStatus,
            notifications_dtos::NotificationResponseDto,
            notifications_dtos::SendNotificationDto,
            notifications_dtos::SendNotificationResultDto,
            ApiResponse<Vec<notifications_dtos::NotificationResponseDto>>,
            ApiResponse<notifications_dtos::SendNotificationResultDto>,
            // Payments
            payments_dtos::WebhookEvent,
            payments_dtos::WebhookObject,
            payments_dtos::WebhookMetadata,
            payments_dtos::WebhookAckDto,
            ApiResponse<payments_dtos::WebhookAckDto>,
            // Admin
            admin_dtos::AssignAgentDto,
            admin_dtos::RejectProofDto,
            admin_dtos::AdminCancelBookingDto,
            admin_dtos::AdminAgentDto,
            admin_dtos::SetAgentTierDto,
            admin_dtos::SetAgentActiveDto,
            admin_dtos::StatusCountDto,
            admin_dtos::DashboardStatsDto,
            ApiResponse<Vec<admin_dtos::AdminAgentDto>>,
            ApiResponse<admin_dtos::DashboardStatsDto>,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "profile", description = "Own profile, agent profile, addresses and notification preferences"),
        (name = "catalog", description = "Service catalog (public) and agent suggestions"),
        (name = "slots", description = "Bookable calendar slots"),
        (name = "bookings", description = "Client bookings and cancellation"),
        (name = "agent-jobs", description = "Agent job lifecycle"),
        (name = "ratings", description = "Ratings of completed jobs"),
        (name = "notifications", description = "SMS notifications"),
        (name = "payments", description = "Payments provider webhook"),
        (name = "admin", description = "Admin console (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "ServiceHub API",
        version = "0.1.0",
        description = "API documentation for the ServiceHub marketplace",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_marketplace_paths() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/requests",
            "/api/requests/{id}/cancel",
            "/api/requests/{id}/rate",
            "/api/agent/jobs/{id}/proof",
            "/api/admin/bookings/{id}/charge",
            "/api/payments/webhook",
            "/api/notifications/send",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
