use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::*;
use crate::features::bookings::dtos::{BookingDetailDto, BookingResponseDto};
use crate::features::bookings::models::{progress_of, PaymentStatus};
use crate::features::bookings::policies::{transition, BookingAction, BookingStatus};
use crate::features::bookings::services::payment_state::set_payment_status;
use crate::features::bookings::services::transitions;
use crate::features::bookings::{BookingService, CancelledBy};
use crate::features::jobs::JobService;
use crate::features::notifications::models::NotificationKind;
use crate::features::notifications::NotificationService;
use crate::features::profiles::dtos::AgentProfileResponseDto;
use crate::features::profiles::models::{AgentProfile, AgentTier};
use crate::features::profiles::ProfileService;
use crate::modules::payments::{ChargeRequest, PaymentGateway};
use crate::shared::money::Money;

const AGENT_SELECT: &str = r#"
    SELECT a.user_id, p.full_name, p.email, p.phone, a.tier, a.is_active, a.is_available,
           a.rating_average, a.rating_count, a.completed_jobs, a.created_at
    FROM agent_profiles a
    JOIN profiles p ON p.id = a.user_id
"#;

/// Service for the admin console
pub struct AdminService {
    pool: PgPool,
    bookings: Arc<BookingService>,
    jobs: Arc<JobService>,
    profiles: Arc<ProfileService>,
    notifications: Arc<NotificationService>,
    payments: Arc<dyn PaymentGateway>,
}

impl AdminService {
    pub fn new(
        pool: PgPool,
        bookings: Arc<BookingService>,
        jobs: Arc<JobService>,
        profiles: Arc<ProfileService>,
        notifications: Arc<NotificationService>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            pool,
            bookings,
            jobs,
            profiles,
            notifications,
            payments,
        }
    }

    // =========================================================================
    // BOOKINGS
    // =========================================================================

    pub async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<BookingResponseDto>, i64)> {
        self.bookings.list(None, status, offset, limit).await
    }

    pub async fn get_booking(&self, id: Uuid) -> Result<BookingDetailDto> {
        let request = self.bookings.require(id).await?;
        self.bookings.detail(request).await
    }

    pub async fn confirm(&self, admin_id: &str, id: Uuid) -> Result<BookingDetailDto> {
        let mut tx = self.pool.begin().await?;

        let request = transitions::lock_request(&mut tx, id).await?;
        let assignment = transitions::active_assignment(&mut *tx, id).await?;
        transitions::apply(
            &mut tx,
            &request,
            BookingAction::Confirm,
            progress_of(assignment.as_ref()),
            admin_id,
        )
        .await?;

        tx.commit().await?;

        self.notifications
            .notify_booking(
                &request.notice(),
                NotificationKind::BookingConfirmed,
                minijinja::context! {},
            )
            .await;

        self.get_booking(id).await
    }

    /// Hand a booking to an agent; any active agent qualifies regardless of availability
    pub async fn assign_agent(
        &self,
        admin_id: &str,
        id: Uuid,
        dto: AssignAgentDto,
    ) -> Result<BookingDetailDto> {
        self.profiles
            .find_agent_profile(&dto.agent_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or_else(|| AppError::BadRequest("Agent not found or inactive".to_string()))?;

        let mut tx = self.pool.begin().await?;

        let request = transitions::lock_request(&mut tx, id).await?;
        if transitions::lock_active_assignment(&mut tx, id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Booking already has an agent".to_string(),
            ));
        }

        transitions::apply(
            &mut tx,
            &request,
            BookingAction::Assign,
            Default::default(),
            admin_id,
        )
        .await?;

        sqlx::query(
            "INSERT INTO job_assignments (request_id, agent_id, assigned_by) VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(&dto.agent_id)
        .bind(admin_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Booking already has an agent".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        tx.commit().await?;

        tracing::info!(
            "Booking {} assigned to agent {} by {}",
            request.reference_number,
            dto.agent_id,
            admin_id
        );

        self.jobs.notify_assigned(&request, &dto.agent_id).await;

        self.get_booking(id).await
    }

    /// Accept the agent's proof photos
    pub async fn verify(&self, admin_id: &str, id: Uuid) -> Result<BookingDetailDto> {
        let mut tx = self.pool.begin().await?;

        let request = transitions::lock_request(&mut tx, id).await?;
        let assignment = transitions::lock_active_assignment(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Booking has no active agent".to_string()))?;

        transitions::apply(
            &mut tx,
            &request,
            BookingAction::Verify,
            assignment.progress(),
            admin_id,
        )
        .await?;

        sqlx::query(
            r#"
            UPDATE job_assignments
            SET verified_at = NOW(), verified_by = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(assignment.id)
        .bind(admin_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_booking(id).await
    }

    /// Send the job back to the agent for new photos
    pub async fn reject_proof(
        &self,
        admin_id: &str,
        id: Uuid,
        dto: RejectProofDto,
    ) -> Result<BookingDetailDto> {
        let mut tx = self.pool.begin().await?;

        let request = transitions::lock_request(&mut tx, id).await?;
        let assignment = transitions::lock_active_assignment(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Booking has no active agent".to_string()))?;

        transitions::apply(
            &mut tx,
            &request,
            BookingAction::RejectProof,
            assignment.progress(),
            admin_id,
        )
        .await?;

        sqlx::query(
            "UPDATE job_assignments SET checked_out_at = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(assignment.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Proof for {} rejected by {}: {}",
            request.reference_number,
            admin_id,
            dto.reason.as_deref().unwrap_or("no reason given")
        );

        self.get_booking(id).await
    }

    /// Charge the client's card on file for a verified booking
    pub async fn charge(&self, admin_id: &str, id: Uuid) -> Result<BookingDetailDto> {
        let request = self.bookings.require(id).await?;
        let assignment = transitions::active_assignment(&self.pool, id).await?;
        transition(
            request.status,
            BookingAction::MarkPaid,
            progress_of(assignment.as_ref()),
        )?;

        if request.payment_status == PaymentStatus::Paid {
            return Err(AppError::Conflict("Booking is already paid".to_string()));
        }

        let profile = self.profiles.find_profile(&request.client_id).await?;
        let (customer_id, payment_method_id) = profile
            .as_ref()
            .and_then(|p| p.card_on_file())
            .ok_or_else(|| AppError::BadRequest("Client has no card on file".to_string()))?;

        let outcome = self
            .payments
            .charge(ChargeRequest {
                customer_id: customer_id.to_string(),
                payment_method_id: payment_method_id.to_string(),
                amount: request.total_price_cents,
                description: format!("{} {}", request.service_name, request.reference_number),
                request_id: request.id.to_string(),
                idempotency_key: format!("charge-{}", request.id),
            })
            .await;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Charge for {} failed: {}", request.reference_number, e);
                set_payment_status(&self.pool, id, PaymentStatus::Failed, None).await?;
                return Err(e.into());
            }
        };

        if !outcome.succeeded() {
            tracing::info!(
                "Payment {} for {} is {}, awaiting webhook",
                outcome.reference,
                request.reference_number,
                outcome.status
            );
            set_payment_status(&self.pool, id, request.payment_status, Some(&outcome.reference))
                .await?;
            return self.get_booking(id).await;
        }

        self.record_payment(admin_id, id, &outcome.reference).await?;
        self.get_booking(id).await
    }

    async fn record_payment(&self, admin_id: &str, id: Uuid, reference: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let request = transitions::lock_request(&mut tx, id).await?;
        set_payment_status(&mut *tx, id, PaymentStatus::Paid, Some(reference)).await?;

        // The webhook may have moved the booking on while the charge was in flight
        if request.status == BookingStatus::Verified {
            let assignment = transitions::active_assignment(&mut *tx, id).await?;
            transitions::apply(
                &mut tx,
                &request,
                BookingAction::MarkPaid,
                progress_of(assignment.as_ref()),
                admin_id,
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Booking {} paid ({}), charged by {}",
            request.reference_number,
            reference,
            admin_id
        );

        Ok(())
    }

    pub async fn complete(&self, admin_id: &str, id: Uuid) -> Result<BookingDetailDto> {
        let mut tx = self.pool.begin().await?;

        let request = transitions::lock_request(&mut tx, id).await?;
        let assignment = transitions::lock_active_assignment(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Booking has no active agent".to_string()))?;

        transitions::apply(
            &mut tx,
            &request,
            BookingAction::Complete,
            assignment.progress(),
            admin_id,
        )
        .await?;

        sqlx::query(
            r#"
            UPDATE agent_profiles
            SET completed_jobs = completed_jobs + 1, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(&assignment.agent_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.notifications
            .notify_booking(
                &request.notice(),
                NotificationKind::JobCompleted,
                minijinja::context! {},
            )
            .await;

        self.get_booking(id).await
    }

    /// Cancel on behalf of the client, without a fee
    pub async fn cancel(
        &self,
        admin_id: &str,
        id: Uuid,
        dto: AdminCancelBookingDto,
    ) -> Result<BookingDetailDto> {
        self.bookings
            .cancel(id, admin_id, CancelledBy::Admin, dto.reason)
            .await
    }

    // =========================================================================
    // AGENTS
    // =========================================================================

    pub async fn list_agents(
        &self,
        params: &AdminAgentQueryParams,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AdminAgentDto>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM agent_profiles a
            WHERE ($1::BOOLEAN IS NULL OR a.is_active = $1)
              AND ($2::agent_tier IS NULL OR a.tier = $2)
            "#,
        )
        .bind(params.is_active)
        .bind(params.tier)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, AdminAgentDto>(&format!(
            r#"
            {AGENT_SELECT}
            WHERE ($1::BOOLEAN IS NULL OR a.is_active = $1)
              AND ($2::agent_tier IS NULL OR a.tier = $2)
            ORDER BY a.rating_average DESC, a.created_at
            OFFSET $3 LIMIT $4
            "#
        ))
        .bind(params.is_active)
        .bind(params.tier)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list agents: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((items, total))
    }

    pub async fn set_agent_tier(
        &self,
        user_id: &str,
        tier: AgentTier,
    ) -> Result<AgentProfileResponseDto> {
        let agent = sqlx::query_as::<_, AgentProfile>(
            r#"
            UPDATE agent_profiles SET tier = $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(tier)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Agent not found".to_string()))?;

        tracing::info!("Agent {} moved to tier {:?}", user_id, tier);

        Ok(agent.into())
    }

    /// Deactivated agents keep their history but lose access to jobs
    pub async fn set_agent_active(
        &self,
        user_id: &str,
        is_active: bool,
    ) -> Result<AgentProfileResponseDto> {
        let agent = sqlx::query_as::<_, AgentProfile>(
            r#"
            UPDATE agent_profiles SET is_active = $2, updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Agent not found".to_string()))?;

        tracing::info!(
            "Agent {} {}",
            user_id,
            if is_active { "activated" } else { "deactivated" }
        );

        Ok(agent.into())
    }

    // =========================================================================
    // DASHBOARD
    // =========================================================================

    pub async fn dashboard_stats(&self) -> Result<DashboardStatsDto> {
        let bookings_by_status = sqlx::query_as::<_, StatusCountDto>(
            "SELECT status, COUNT(*) AS count FROM service_requests GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count bookings by status: {:?}", e);
            AppError::Database(e)
        })?;

        let revenue: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN status = 'cancelled'
                     THEN COALESCE(cancellation_fee_cents, 0)
                     ELSE total_price_cents - COALESCE(refund_amount_cents, 0)
                END
            ), 0)::BIGINT
            FROM service_requests
            WHERE payment_status IN ('paid', 'partially_refunded')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let active_agents: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM agent_profiles WHERE is_active")
                .fetch_one(&self.pool)
                .await?;

        let average_rating: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(score)::FLOAT8 FROM ratings WHERE rater_type = 'client'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStatsDto {
            total_bookings: bookings_by_status.iter().map(|s| s.count).sum(),
            bookings_by_status,
            revenue_cents: Money::from_cents(revenue),
            active_agents,
            average_rating,
        })
    }
}
