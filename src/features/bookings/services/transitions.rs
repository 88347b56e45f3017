//! Persistence side of the lifecycle state machine.
//!
//! Callers lock the booking row, compute the next status with
//! [`transition`](crate::features::bookings::policies::transition) and write it
//! back with [`apply`], which also appends the audit event. Everything runs on
//! the caller's transaction.

use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::bookings::models::*;
use crate::features::bookings::policies::{transition, BookingAction, BookingStatus, JobProgress};

pub async fn find_request<'e, E>(executor: E, id: Uuid) -> Result<Option<ServiceRequest>>
where
    E: PgExecutor<'e>,
{
    let request = sqlx::query_as::<_, ServiceRequest>(&format!("{REQUEST_SELECT} WHERE r.id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(request)
}

/// Fetch a booking and hold its row lock until the transaction ends
pub async fn lock_request(conn: &mut PgConnection, id: Uuid) -> Result<ServiceRequest> {
    sqlx::query_as::<_, ServiceRequest>(&format!(
        "{REQUEST_SELECT} WHERE r.id = $1 FOR UPDATE OF r"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

pub async fn active_assignment<'e, E>(executor: E, request_id: Uuid) -> Result<Option<JobAssignment>>
where
    E: PgExecutor<'e>,
{
    let assignment = sqlx::query_as::<_, JobAssignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM job_assignments WHERE request_id = $1 AND is_active"
    ))
    .bind(request_id)
    .fetch_optional(executor)
    .await?;

    Ok(assignment)
}

pub async fn lock_active_assignment(
    conn: &mut PgConnection,
    request_id: Uuid,
) -> Result<Option<JobAssignment>> {
    let assignment = sqlx::query_as::<_, JobAssignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM job_assignments \
         WHERE request_id = $1 AND is_active FOR UPDATE"
    ))
    .bind(request_id)
    .fetch_optional(conn)
    .await?;

    Ok(assignment)
}

/// Move a locked booking to its next status and record the event.
///
/// The update is guarded by the status the caller read, so a concurrent
/// writer that slipped past the lock surfaces as a conflict.
pub async fn apply(
    conn: &mut PgConnection,
    request: &ServiceRequest,
    action: BookingAction,
    progress: JobProgress,
    actor_id: &str,
) -> Result<BookingStatus> {
    let next = transition(request.status, action, progress)?;

    if next != request.status {
        let result = sqlx::query(
            r#"
            UPDATE service_requests
            SET status = $2,
                completed_at = CASE WHEN $2 = 'completed'::booking_status THEN NOW() ELSE completed_at END,
                updated_at = NOW()
            WHERE id = $1 AND status = $3
            "#,
        )
        .bind(request.id)
        .bind(next)
        .bind(request.status)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Booking was changed by another request, please retry".to_string(),
            ));
        }
    }

    sqlx::query(
        r#"
        INSERT INTO booking_events (request_id, from_status, to_status, action, actor_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(request.id)
    .bind(request.status)
    .bind(next)
    .bind(action.as_str())
    .bind(actor_id)
    .execute(&mut *conn)
    .await?;

    tracing::info!(
        "Booking {} {}: {} -> {} by {}",
        request.reference_number,
        action,
        request.status,
        next,
        actor_id
    );

    Ok(next)
}

pub async fn list_events<'e, E>(executor: E, request_id: Uuid) -> Result<Vec<BookingEvent>>
where
    E: PgExecutor<'e>,
{
    let events = sqlx::query_as::<_, BookingEvent>(
        "SELECT id, request_id, from_status, to_status, action, actor_id, created_at \
         FROM booking_events WHERE request_id = $1 ORDER BY created_at",
    )
    .bind(request_id)
    .fetch_all(executor)
    .await?;

    Ok(events)
}
