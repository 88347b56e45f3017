use std::sync::Arc;

use chrono::{FixedOffset, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::bookings::dtos::*;
use crate::features::bookings::models::*;
use crate::features::bookings::policies::{
    allowed_actions, quote, transition, waived_quote, BookingAction, BookingStatus,
    CancellationQuote,
};
use crate::features::bookings::services::payment_state::{set_payment_status, status_after_refund};
use crate::features::bookings::services::transitions;
use crate::features::catalog::CatalogService;
use crate::features::notifications::models::NotificationKind;
use crate::features::notifications::NotificationService;
use crate::features::profiles::ProfileService;
use crate::features::slots::services::{release_slot, reserve_slot};
use crate::modules::payments::{ChargeRequest, PaymentGateway, RefundRequest};
use crate::modules::storage::MinIOClient;
use crate::shared::money::Money;

/// Who is cancelling; admins cancel without a fee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelledBy {
    Client,
    Admin,
}

/// Service for client bookings
pub struct BookingService {
    pool: PgPool,
    catalog: Arc<CatalogService>,
    profiles: Arc<ProfileService>,
    notifications: Arc<NotificationService>,
    payments: Arc<dyn PaymentGateway>,
    storage: Arc<MinIOClient>,
    service_area_offset: FixedOffset,
}

impl BookingService {
    pub fn new(
        pool: PgPool,
        catalog: Arc<CatalogService>,
        profiles: Arc<ProfileService>,
        notifications: Arc<NotificationService>,
        payments: Arc<dyn PaymentGateway>,
        storage: Arc<MinIOClient>,
        service_area_offset: FixedOffset,
    ) -> Self {
        Self {
            pool,
            catalog,
            profiles,
            notifications,
            payments,
            storage,
            service_area_offset,
        }
    }

    /// Book a catalog service at a preferred local date and time
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateBookingDto,
    ) -> Result<BookingDetailDto> {
        self.profiles.ensure_profile(user).await?;

        let service = self
            .catalog
            .find_by_id(dto.service_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

        if let Some(address_id) = dto.address_id {
            self.profiles
                .find_address(&user.sub, address_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Address not found".to_string()))?;
        }

        let scheduled_at = scheduled_at(
            dto.preferred_date,
            dto.preferred_time,
            self.service_area_offset,
        )
        .ok_or_else(|| AppError::BadRequest("Invalid preferred date or time".to_string()))?;

        let now = Utc::now();
        if scheduled_at <= now {
            return Err(AppError::BadRequest(
                "Preferred time must be in the future".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        if let Some(slot_id) = dto.slot_id {
            let slot = reserve_slot(&mut tx, slot_id).await?;
            if !slot.covers(dto.preferred_date, dto.preferred_time) {
                return Err(AppError::BadRequest(
                    "Preferred time is outside the selected slot".to_string(),
                ));
            }
        }

        let sequence: i64 = sqlx::query_scalar("SELECT nextval('booking_reference_seq')")
            .fetch_one(&mut *tx)
            .await?;
        let reference_number =
            format_reference(reference_year(now, self.service_area_offset), sequence);

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO service_requests
                (reference_number, client_id, service_id, address_id, slot_id,
                 preferred_date, preferred_time, scheduled_at, notes, total_price_cents)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&reference_number)
        .bind(&user.sub)
        .bind(service.id)
        .bind(dto.address_id)
        .bind(dto.slot_id)
        .bind(dto.preferred_date)
        .bind(dto.preferred_time)
        .bind(scheduled_at)
        .bind(&dto.notes)
        .bind(service.base_price_cents)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create booking: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        tracing::info!(
            "Booking {} created: client={}, service={}, scheduled_at={}",
            reference_number,
            user.sub,
            service.slug,
            scheduled_at
        );

        let request = self.require(id).await?;
        self.detail(request).await
    }

    /// List bookings, newest first. `client_id` restricts to one client.
    pub async fn list(
        &self,
        client_id: Option<&str>,
        status: Option<BookingStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<BookingResponseDto>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM service_requests r
            WHERE ($1::TEXT IS NULL OR r.client_id = $1)
              AND ($2::booking_status IS NULL OR r.status = $2)
            "#,
        )
        .bind(client_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            {REQUEST_SELECT}
            WHERE ($1::TEXT IS NULL OR r.client_id = $1)
              AND ($2::booking_status IS NULL OR r.status = $2)
            ORDER BY r.created_at DESC
            OFFSET $3 LIMIT $4
            "#
        ))
        .bind(client_id)
        .bind(status)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list bookings: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    pub async fn require(&self, id: Uuid) -> Result<ServiceRequest> {
        transitions::find_request(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
    }

    /// A client's own booking; other clients' bookings look absent
    pub async fn require_owned(&self, client_id: &str, id: Uuid) -> Result<ServiceRequest> {
        let request = self.require(id).await?;
        if request.client_id != client_id {
            return Err(AppError::NotFound("Booking not found".to_string()));
        }
        Ok(request)
    }

    pub async fn get_for_client(&self, client_id: &str, id: Uuid) -> Result<BookingDetailDto> {
        let request = self.require_owned(client_id, id).await?;
        self.detail(request).await
    }

    /// Booking with active assignment, history and allowed actions
    pub async fn detail(&self, request: ServiceRequest) -> Result<BookingDetailDto> {
        let assignment = transitions::active_assignment(&self.pool, request.id).await?;
        let events = transitions::list_events(&self.pool, request.id).await?;
        let progress = progress_of(assignment.as_ref());

        let assignment = match assignment {
            Some(a) => {
                let before = self.photo_url(a.before_photo_key.as_deref()).await;
                let after = self.photo_url(a.after_photo_key.as_deref()).await;
                Some(AssignmentResponseDto::from_assignment(&a, before, after))
            }
            None => None,
        };

        Ok(BookingDetailDto {
            allowed_actions: allowed_actions(request.status, progress),
            booking: request.into(),
            assignment,
            events: events.into_iter().map(Into::into).collect(),
        })
    }

    async fn photo_url(&self, key: Option<&str>) -> Option<String> {
        let key = key?;
        match self.storage.get_presigned_url(key).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("Could not presign proof photo {}: {}", key, e);
                None
            }
        }
    }

    /// What cancelling now would cost
    pub async fn cancellation_quote(&self, client_id: &str, id: Uuid) -> Result<CancellationQuote> {
        let request = self.require_owned(client_id, id).await?;

        let assignment = transitions::active_assignment(&self.pool, id).await?;
        transition(
            request.status,
            BookingAction::Cancel,
            progress_of(assignment.as_ref()),
        )?;

        Ok(quote(
            request.scheduled_at,
            Utc::now(),
            request.total_price_cents,
        ))
    }

    /// Cancel a booking, release its slot and settle fee or refund with the vendor
    pub async fn cancel(
        &self,
        id: Uuid,
        actor_id: &str,
        by: CancelledBy,
        reason: Option<String>,
    ) -> Result<BookingDetailDto> {
        let mut tx = self.pool.begin().await?;

        let request = transitions::lock_request(&mut tx, id).await?;
        if by == CancelledBy::Client && request.client_id != actor_id {
            return Err(AppError::NotFound("Booking not found".to_string()));
        }

        let assignment = transitions::lock_active_assignment(&mut tx, id).await?;
        transitions::apply(
            &mut tx,
            &request,
            BookingAction::Cancel,
            progress_of(assignment.as_ref()),
            actor_id,
        )
        .await?;

        let now = Utc::now();
        let terms = match by {
            CancelledBy::Client => quote(request.scheduled_at, now, request.total_price_cents),
            CancelledBy::Admin => {
                waived_quote(request.scheduled_at, now, request.total_price_cents)
            }
        };
        let fee = terms.fee_cents;
        let refund = if request.payment_status == PaymentStatus::Paid {
            terms.refund_cents
        } else {
            Money::ZERO
        };

        sqlx::query(
            r#"
            UPDATE service_requests SET
                cancellation_fee_cents = $2,
                refund_amount_cents = $3,
                cancellation_reason = $4,
                cancelled_by = $5,
                cancelled_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(fee)
        .bind(refund)
        .bind(&reason)
        .bind(actor_id)
        .execute(&mut *tx)
        .await?;

        if let Some(assignment) = &assignment {
            sqlx::query(
                "UPDATE job_assignments SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
            )
            .bind(assignment.id)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(slot_id) = request.slot_id {
            release_slot(&mut tx, slot_id).await?;
        }

        tx.commit().await?;

        tracing::info!(
            "Booking {} cancelled by {} ({:?}): fee={}, refund={}",
            request.reference_number,
            actor_id,
            by,
            fee,
            refund
        );

        self.settle_cancellation(&request, fee, refund).await;

        self.notifications
            .notify_booking(
                &request.notice(),
                NotificationKind::BookingCancelled,
                self.notifications.cancellation_context(fee, refund),
            )
            .await;

        let request = self.require(id).await?;
        self.detail(request).await
    }

    /// Refund a paid booking or collect the fee from the card on file.
    ///
    /// The cancellation is already committed; vendor failures are logged and
    /// left for the payments webhook or an admin to resolve.
    async fn settle_cancellation(&self, request: &ServiceRequest, fee: Money, refund: Money) {
        if request.payment_status == PaymentStatus::Paid {
            if refund.is_zero() {
                return;
            }
            let Some(reference) = request.payment_reference.clone() else {
                tracing::warn!(
                    "Booking {} is paid but has no payment reference, refund skipped",
                    request.reference_number
                );
                return;
            };

            let outcome = self
                .payments
                .refund(RefundRequest {
                    payment_reference: reference,
                    amount: refund,
                    idempotency_key: format!("refund-{}", request.id),
                })
                .await;

            match outcome {
                Ok(outcome) if outcome.succeeded() => {
                    let status = status_after_refund(request.total_price_cents, refund);
                    if let Err(e) = set_payment_status(&self.pool, request.id, status, None).await {
                        tracing::error!("Failed to record refund for {}: {}", request.reference_number, e);
                    }
                }
                Ok(outcome) => tracing::info!(
                    "Refund {} for {} is {}, awaiting webhook",
                    outcome.reference,
                    request.reference_number,
                    outcome.status
                ),
                Err(e) => tracing::error!("Refund for {} failed: {}", request.reference_number, e),
            }
            return;
        }

        if fee.is_zero() {
            return;
        }

        let profile = match self.profiles.find_profile(&request.client_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!("Failed to load client {}: {}", request.client_id, e);
                return;
            }
        };
        let Some((customer_id, payment_method_id)) =
            profile.as_ref().and_then(|p| p.card_on_file())
        else {
            tracing::info!(
                "No card on file for {}, cancellation fee {} recorded only",
                request.reference_number,
                fee
            );
            return;
        };

        let outcome = self
            .payments
            .charge(ChargeRequest {
                customer_id: customer_id.to_string(),
                payment_method_id: payment_method_id.to_string(),
                amount: fee,
                description: format!("Cancellation fee for {}", request.reference_number),
                request_id: request.id.to_string(),
                idempotency_key: format!("cancel-fee-{}", request.id),
            })
            .await;

        match outcome {
            Ok(outcome) => {
                let status = if outcome.succeeded() {
                    PaymentStatus::Paid
                } else {
                    request.payment_status
                };
                if let Err(e) =
                    set_payment_status(&self.pool, request.id, status, Some(&outcome.reference))
                        .await
                {
                    tracing::error!("Failed to record fee charge for {}: {}", request.reference_number, e);
                }
            }
            Err(e) => {
                tracing::error!(
                    "Cancellation fee charge for {} failed: {}",
                    request.reference_number,
                    e
                );
                if let Err(e) =
                    set_payment_status(&self.pool, request.id, PaymentStatus::Failed, None).await
                {
                    tracing::error!("Failed to record fee failure: {}", e);
                }
            }
        }
    }
}
