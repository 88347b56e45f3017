use std::sync::Arc;

use minijinja::context;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::bookings::dtos::BookingDetailDto;
use crate::features::bookings::models::{JobAssignment, ServiceRequest};
use crate::features::bookings::policies::{transition, BookingAction, BookingStatus, JobProgress};
use crate::features::bookings::services::transitions;
use crate::features::bookings::BookingService;
use crate::features::jobs::dtos::*;
use crate::features::notifications::models::NotificationKind;
use crate::features::notifications::NotificationService;
use crate::features::profiles::ProfileService;
use crate::modules::storage::MinIOClient;

const AGENT_JOB_SELECT: &str = r#"
    SELECT r.id AS request_id, r.reference_number, s.name AS service_name, r.scheduled_at,
           r.status, r.total_price_cents, a.id AS assignment_id, a.is_active,
           a.assigned_at, a.checked_in_at, a.checked_out_at
    FROM job_assignments a
    JOIN service_requests r ON r.id = a.request_id
    JOIN service_catalog s ON s.id = r.service_id
"#;

/// Service for the agent side of the job lifecycle
pub struct JobService {
    pool: PgPool,
    profiles: Arc<ProfileService>,
    bookings: Arc<BookingService>,
    notifications: Arc<NotificationService>,
    storage: Arc<MinIOClient>,
}

impl JobService {
    pub fn new(
        pool: PgPool,
        profiles: Arc<ProfileService>,
        bookings: Arc<BookingService>,
        notifications: Arc<NotificationService>,
        storage: Arc<MinIOClient>,
    ) -> Self {
        Self {
            pool,
            profiles,
            bookings,
            notifications,
            storage,
        }
    }

    /// Open bookings nobody has taken yet, soonest first
    pub async fn list_available(
        &self,
        agent_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AgentJobDto>, i64)> {
        self.profiles.require_active_agent(agent_id).await?;

        const OPEN: &str = r#"
            r.status IN ('pending', 'confirmed')
            AND r.scheduled_at > NOW()
            AND NOT EXISTS (
                SELECT 1 FROM job_assignments a WHERE a.request_id = r.id AND a.is_active
            )
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM service_requests r WHERE {OPEN}"
        ))
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, AgentJobDto>(&format!(
            r#"
            SELECT r.id AS request_id, r.reference_number, s.name AS service_name,
                   r.scheduled_at, r.status, r.total_price_cents,
                   NULL::UUID AS assignment_id, FALSE AS is_active,
                   NULL::TIMESTAMPTZ AS assigned_at, NULL::TIMESTAMPTZ AS checked_in_at,
                   NULL::TIMESTAMPTZ AS checked_out_at
            FROM service_requests r
            JOIN service_catalog s ON s.id = r.service_id
            WHERE {OPEN}
            ORDER BY r.scheduled_at
            OFFSET $1 LIMIT $2
            "#
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list available jobs: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((rows, total))
    }

    /// The agent's jobs, current and past
    pub async fn list_mine(
        &self,
        agent_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AgentJobDto>, i64)> {
        self.profiles.require_active_agent(agent_id).await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM job_assignments WHERE agent_id = $1")
                .bind(agent_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, AgentJobDto>(&format!(
            r#"
            {AGENT_JOB_SELECT}
            WHERE a.agent_id = $1
            ORDER BY a.is_active DESC, r.scheduled_at DESC
            OFFSET $2 LIMIT $3
            "#
        ))
        .bind(agent_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Job detail for an agent who is or was assigned to it
    pub async fn get(&self, agent_id: &str, request_id: Uuid) -> Result<BookingDetailDto> {
        self.profiles.require_active_agent(agent_id).await?;

        let involved: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM job_assignments WHERE request_id = $1 AND agent_id = $2)",
        )
        .bind(request_id)
        .bind(agent_id)
        .fetch_one(&self.pool)
        .await?;

        if !involved {
            return Err(AppError::NotFound("Job not found".to_string()));
        }

        let request = self.bookings.require(request_id).await?;
        self.bookings.detail(request).await
    }

    /// Take an open booking
    pub async fn accept(&self, agent_id: &str, request_id: Uuid) -> Result<BookingDetailDto> {
        let agent = self.profiles.require_active_agent(agent_id).await?;
        if !agent.is_available {
            return Err(AppError::Forbidden(
                "Set yourself available before accepting jobs".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let request = transitions::lock_request(&mut tx, request_id).await?;
        if transitions::lock_active_assignment(&mut tx, request_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Job has already been taken".to_string()));
        }

        transitions::apply(
            &mut tx,
            &request,
            BookingAction::Assign,
            Default::default(),
            agent_id,
        )
        .await?;

        sqlx::query(
            "INSERT INTO job_assignments (request_id, agent_id, assigned_by) VALUES ($1, $2, $2)",
        )
        .bind(request_id)
        .bind(agent_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Job has already been taken".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        tx.commit().await?;

        tracing::info!("Agent {} accepted job {}", agent_id, request.reference_number);
        self.notify_assigned(&request, agent_id).await;

        self.reload(request_id).await
    }

    pub async fn check_in(&self, agent_id: &str, request_id: Uuid) -> Result<BookingDetailDto> {
        self.profiles.require_active_agent(agent_id).await?;

        let mut tx = self.pool.begin().await?;
        let (request, assignment) = lock_own_job(&mut tx, agent_id, request_id).await?;

        transitions::apply(
            &mut tx,
            &request,
            BookingAction::CheckIn,
            assignment.progress(),
            agent_id,
        )
        .await?;

        sqlx::query(
            "UPDATE job_assignments SET checked_in_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(assignment.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.notifications
            .notify_booking(&request.notice(), NotificationKind::JobStarted, context! {})
            .await;

        self.reload(request_id).await
    }

    /// Store a before or after photo, replacing any earlier one of the same kind.
    ///
    /// The object is uploaded with no transaction open; the row locks are only
    /// taken afterwards to re-check the lifecycle and record the key.
    pub async fn upload_proof(
        &self,
        agent_id: &str,
        request_id: Uuid,
        upload: ProofUpload,
    ) -> Result<BookingDetailDto> {
        self.profiles.require_active_agent(agent_id).await?;

        let (request, assignment) = self.find_own_job(agent_id, request_id).await?;
        check_proof_upload(request.status, assignment.progress())?;

        let key = self
            .storage
            .proof_key(assignment.id, upload.kind.as_str(), upload.extension());
        self.storage
            .upload(&key, upload.data, &upload.content_type)
            .await?;

        let previous = match self
            .record_proof(agent_id, request_id, assignment.id, upload.kind, &key)
            .await
        {
            Ok(previous) => previous,
            Err(e) => {
                self.discard_object(&key).await;
                return Err(e);
            }
        };

        tracing::info!(
            "Agent {} uploaded {} photo for {}",
            agent_id,
            upload.kind.as_str(),
            request.reference_number
        );

        if let Some(previous) = previous {
            self.discard_object(&previous).await;
        }

        self.reload(request_id).await
    }

    /// Lock the job again and point the assignment at the uploaded object,
    /// returning the key it replaces
    async fn record_proof(
        &self,
        agent_id: &str,
        request_id: Uuid,
        assignment_id: Uuid,
        kind: ProofKind,
        key: &str,
    ) -> Result<Option<String>> {
        let mut tx = self.pool.begin().await?;
        let (request, assignment) = lock_own_job(&mut tx, agent_id, request_id).await?;
        ensure_same_assignment(assignment_id, &assignment)?;

        transitions::apply(
            &mut tx,
            &request,
            BookingAction::UploadProof,
            assignment.progress(),
            agent_id,
        )
        .await?;

        let (column, previous) = proof_slot(&assignment, kind);
        sqlx::query(&format!(
            "UPDATE job_assignments SET {column} = $2, updated_at = NOW() WHERE id = $1"
        ))
        .bind(assignment.id)
        .bind(key)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(previous)
    }

    pub async fn check_out(&self, agent_id: &str, request_id: Uuid) -> Result<BookingDetailDto> {
        self.profiles.require_active_agent(agent_id).await?;

        let mut tx = self.pool.begin().await?;
        let (request, assignment) = lock_own_job(&mut tx, agent_id, request_id).await?;

        transitions::apply(
            &mut tx,
            &request,
            BookingAction::CheckOut,
            assignment.progress(),
            agent_id,
        )
        .await?;

        sqlx::query(
            "UPDATE job_assignments SET checked_out_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(assignment.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.notifications
            .notify_booking(
                &request.notice(),
                NotificationKind::AwaitingVerification,
                context! {},
            )
            .await;

        self.reload(request_id).await
    }

    /// Give a job back; the booking returns to confirmed for another agent
    pub async fn withdraw(
        &self,
        agent_id: &str,
        request_id: Uuid,
        reason: Option<String>,
    ) -> Result<BookingDetailDto> {
        self.profiles.require_active_agent(agent_id).await?;

        let mut tx = self.pool.begin().await?;
        let (request, assignment) = lock_own_job(&mut tx, agent_id, request_id).await?;

        transitions::apply(
            &mut tx,
            &request,
            BookingAction::Withdraw,
            assignment.progress(),
            agent_id,
        )
        .await?;

        sqlx::query(
            r#"
            UPDATE job_assignments
            SET is_active = FALSE, withdrawn_at = NOW(), withdraw_reason = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(assignment.id)
        .bind(&reason)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Agent {} withdrew from {} ({})",
            agent_id,
            request.reference_number,
            reason.as_deref().unwrap_or("no reason given")
        );

        self.reload(request_id).await
    }

    /// Tell the client who is coming
    pub async fn notify_assigned(&self, request: &ServiceRequest, agent_id: &str) {
        let agent_name = match self.profiles.find_profile(agent_id).await {
            Ok(profile) => profile.and_then(|p| p.full_name),
            Err(e) => {
                tracing::warn!("Could not load agent {} for notification: {}", agent_id, e);
                None
            }
        };

        self.notifications
            .notify_booking(
                &request.notice(),
                NotificationKind::AgentAssigned,
                context! { agent_name => agent_name },
            )
            .await;
    }

    /// Unlocked read of a booking and its active assignment held by `agent_id`
    async fn find_own_job(
        &self,
        agent_id: &str,
        request_id: Uuid,
    ) -> Result<(ServiceRequest, JobAssignment)> {
        let request = transitions::find_request(&self.pool, request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        let assignment = transitions::active_assignment(&self.pool, request_id)
            .await?
            .filter(|a| a.agent_id == agent_id)
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

        Ok((request, assignment))
    }

    async fn reload(&self, request_id: Uuid) -> Result<BookingDetailDto> {
        let request = self.bookings.require(request_id).await?;
        self.bookings.detail(request).await
    }

    async fn discard_object(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!("Failed to delete proof photo {}: {}", key, e);
        }
    }
}

/// Lock a booking and its active assignment, which must belong to `agent_id`
async fn lock_own_job(
    conn: &mut PgConnection,
    agent_id: &str,
    request_id: Uuid,
) -> Result<(ServiceRequest, JobAssignment)> {
    let request = transitions::lock_request(&mut *conn, request_id).await?;
    let assignment = transitions::lock_active_assignment(&mut *conn, request_id)
        .await?
        .filter(|a| a.agent_id == agent_id)
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    Ok((request, assignment))
}

/// Lifecycle check for a photo upload, run before anything is stored
fn check_proof_upload(status: BookingStatus, progress: JobProgress) -> Result<()> {
    transition(status, BookingAction::UploadProof, progress)?;
    Ok(())
}

/// The photo was keyed under `expected`; the job must still be held by it
fn ensure_same_assignment(expected: Uuid, locked: &JobAssignment) -> Result<()> {
    if locked.id != expected {
        return Err(AppError::Conflict(
            "The job was reassigned while the photo was uploading".to_string(),
        ));
    }
    Ok(())
}

/// Column and current key of the photo slot for `kind`
fn proof_slot(assignment: &JobAssignment, kind: ProofKind) -> (&'static str, Option<String>) {
    match kind {
        ProofKind::Before => ("before_photo_key", assignment.before_photo_key.clone()),
        ProofKind::After => ("after_photo_key", assignment.after_photo_key.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn assignment(checked_in: bool) -> JobAssignment {
        let now = Utc::now();
        JobAssignment {
            id: Uuid::new_v4(),
            request_id: Uuid::new_v4(),
            agent_id: "agent-1".to_string(),
            is_active: true,
            assigned_by: "agent-1".to_string(),
            assigned_at: now,
            checked_in_at: checked_in.then_some(now),
            checked_out_at: None,
            before_photo_key: Some("private/proofs/a/before-1.jpg".to_string()),
            after_photo_key: None,
            withdrawn_at: None,
            withdraw_reason: None,
            verified_at: None,
            verified_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_upload_requires_check_in() {
        let err = check_proof_upload(BookingStatus::InProgress, assignment(false).progress())
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        assert!(check_proof_upload(BookingStatus::InProgress, assignment(true).progress()).is_ok());
    }

    #[test]
    fn test_upload_rejected_outside_in_progress() {
        for status in [
            BookingStatus::Assigned,
            BookingStatus::PendingVerification,
            BookingStatus::Cancelled,
        ] {
            assert!(check_proof_upload(status, assignment(true).progress()).is_err());
        }
    }

    #[test]
    fn test_reassigned_job_is_a_conflict() {
        let locked = assignment(true);
        assert!(ensure_same_assignment(locked.id, &locked).is_ok());

        let err = ensure_same_assignment(Uuid::new_v4(), &locked).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_proof_slot_returns_replaced_key() {
        let locked = assignment(true);

        let (column, previous) = proof_slot(&locked, ProofKind::Before);
        assert_eq!(column, "before_photo_key");
        assert_eq!(previous.as_deref(), Some("private/proofs/a/before-1.jpg"));

        let (column, previous) = proof_slot(&locked, ProofKind::After);
        assert_eq!(column, "after_photo_key");
        assert!(previous.is_none());
    }
}
