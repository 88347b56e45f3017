use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Who gave a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "rater_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RaterType {
    Client,
    Agent,
}

impl RaterType {
    pub fn as_str(self) -> &'static str {
        match self {
            RaterType::Client => "client",
            RaterType::Agent => "agent",
        }
    }
}

pub const RATING_COLUMNS: &str = "id, job_assignment_id, request_id, rater_id, rater_type, \
     ratee_id, score, comment, created_at";

/// Database model for a rating of one side of a finished job
#[derive(Debug, Clone, FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub job_assignment_id: Uuid,
    pub request_id: Uuid,
    pub rater_id: String,
    pub rater_type: RaterType,
    pub ratee_id: String,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
