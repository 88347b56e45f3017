use std::sync::Arc;

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::bookings::models::{JobAssignment, ServiceRequest, ASSIGNMENT_COLUMNS};
use crate::features::bookings::policies::BookingAction;
use crate::features::bookings::services::transitions;
use crate::features::profiles::ProfileService;
use crate::features::ratings::dtos::{CreateRatingDto, RatingResponseDto};
use crate::features::ratings::models::{RaterType, Rating, RATING_COLUMNS};

const ALREADY_RATED: &str = "already rated";

/// Reject a second rating from the same side of a job
pub fn ensure_not_rated(existing: Option<&Rating>) -> Result<()> {
    match existing {
        Some(_) => Err(AppError::Conflict(ALREADY_RATED.to_string())),
        None => Ok(()),
    }
}

/// Map a failed rating insert, turning the unique index race into the same 409
fn insert_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(ALREADY_RATED.to_string())
    } else {
        AppError::Database(err)
    }
}

pub struct RatingService {
    pool: PgPool,
    profiles: Arc<ProfileService>,
}

impl RatingService {
    pub fn new(pool: PgPool, profiles: Arc<ProfileService>) -> Self {
        Self { pool, profiles }
    }

    /// Client rates the agent who did a completed booking
    pub async fn rate_agent(
        &self,
        client_id: &str,
        request_id: Uuid,
        dto: CreateRatingDto,
    ) -> Result<RatingResponseDto> {
        let mut tx = self.pool.begin().await?;

        let request = transitions::lock_request(&mut tx, request_id).await?;
        if request.client_id != client_id {
            return Err(AppError::NotFound("Booking not found".to_string()));
        }

        let assignment = rated_assignment(&mut tx, &request, None).await?;
        let rating = self
            .record(
                &mut tx,
                &request,
                &assignment,
                client_id,
                RaterType::Client,
                &assignment.agent_id,
                dto,
            )
            .await?;

        // Running average over all client ratings of this agent
        sqlx::query(
            r#"
            UPDATE agent_profiles
            SET rating_average = ROUND(
                    (rating_average * rating_count + $2::NUMERIC) / (rating_count + 1), 2
                ),
                rating_count = rating_count + 1,
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(&assignment.agent_id)
        .bind(rating.score as i32)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Client {} rated agent {} {} on {}",
            client_id,
            rating.ratee_id,
            rating.score,
            request.reference_number
        );

        Ok(rating.into())
    }

    /// Agent rates the client of a booking they completed
    pub async fn rate_client(
        &self,
        agent_id: &str,
        request_id: Uuid,
        dto: CreateRatingDto,
    ) -> Result<RatingResponseDto> {
        self.profiles.require_active_agent(agent_id).await?;

        let mut tx = self.pool.begin().await?;

        let request = transitions::lock_request(&mut tx, request_id).await?;
        let assignment = rated_assignment(&mut tx, &request, Some(agent_id)).await?;
        let client_id = request.client_id.clone();

        let rating = self
            .record(
                &mut tx,
                &request,
                &assignment,
                agent_id,
                RaterType::Agent,
                &client_id,
                dto,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Agent {} rated client {} {} on {}",
            agent_id,
            client_id,
            rating.score,
            request.reference_number
        );

        Ok(rating.into())
    }

    #[allow(clippy::too_many_arguments)]
    async fn record(
        &self,
        conn: &mut PgConnection,
        request: &ServiceRequest,
        assignment: &JobAssignment,
        rater_id: &str,
        rater_type: RaterType,
        ratee_id: &str,
        dto: CreateRatingDto,
    ) -> Result<Rating> {
        transitions::apply(
            &mut *conn,
            request,
            BookingAction::Rate,
            assignment.progress(),
            rater_id,
        )
        .await?;

        let existing = sqlx::query_as::<_, Rating>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings \
             WHERE job_assignment_id = $1 AND rater_type = $2"
        ))
        .bind(assignment.id)
        .bind(rater_type)
        .fetch_optional(&mut *conn)
        .await?;
        ensure_not_rated(existing.as_ref())?;

        let comment = dto
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        sqlx::query_as::<_, Rating>(&format!(
            r#"
            INSERT INTO ratings
                (job_assignment_id, request_id, rater_id, rater_type, ratee_id, score, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {RATING_COLUMNS}
            "#
        ))
        .bind(assignment.id)
        .bind(request.id)
        .bind(rater_id)
        .bind(rater_type)
        .bind(ratee_id)
        .bind(dto.score)
        .bind(comment)
        .fetch_one(&mut *conn)
        .await
        .map_err(insert_error)
    }
}

/// The assignment that carried a booking to completion.
///
/// With `agent_id` set, only that agent's assignment qualifies.
async fn rated_assignment(
    conn: &mut PgConnection,
    request: &ServiceRequest,
    agent_id: Option<&str>,
) -> Result<JobAssignment> {
    let assignment = sqlx::query_as::<_, JobAssignment>(&format!(
        r#"
        SELECT {ASSIGNMENT_COLUMNS} FROM job_assignments
        WHERE request_id = $1 AND is_active
          AND ($2::TEXT IS NULL OR agent_id = $2)
        "#
    ))
    .bind(request.id)
    .bind(agent_id)
    .fetch_optional(&mut *conn)
    .await?;

    match (assignment, agent_id) {
        (Some(assignment), _) => Ok(assignment),
        (None, Some(_)) => Err(AppError::NotFound("Job not found".to_string())),
        (None, None) => Err(AppError::BadRequest(
            "This booking has no agent to rate".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Utc;

    fn rating(rater_type: RaterType) -> Rating {
        Rating {
            id: Uuid::new_v4(),
            job_assignment_id: Uuid::new_v4(),
            request_id: Uuid::new_v4(),
            rater_id: "test-client".to_string(),
            rater_type,
            ratee_id: "test-agent".to_string(),
            score: 5,
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_rating_is_allowed() {
        assert!(ensure_not_rated(None).is_ok());
    }

    #[test]
    fn test_second_rating_is_conflict() {
        let existing = rating(RaterType::Client);
        let err = ensure_not_rated(Some(&existing)).unwrap_err();

        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Conflict: already rated");
    }

    #[test]
    fn test_other_insert_errors_stay_database_errors() {
        let err = insert_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }
}
