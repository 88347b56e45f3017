use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::ratings::models::{RaterType, Rating};

/// Request DTO for rating the other side of a completed job
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingDto {
    #[validate(range(min = 1, max = 5, message = "Score must be between 1 and 5"))]
    pub score: i16,

    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponseDto {
    pub id: Uuid,
    pub request_id: Uuid,
    pub job_assignment_id: Uuid,
    pub rater_type: RaterType,
    pub ratee_id: String,
    pub score: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Rating> for RatingResponseDto {
    fn from(r: Rating) -> Self {
        Self {
            id: r.id,
            request_id: r.request_id,
            job_assignment_id: r.job_assignment_id,
            rater_type: r.rater_type,
            ratee_id: r.ratee_id,
            score: r.score,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    #[test]
    fn test_score_bounds() {
        for score in 1..=5 {
            let dto = CreateRatingDto {
                score,
                comment: None,
            };
            assert!(dto.validate().is_ok(), "score {score} should be accepted");
        }

        for score in [0, 6, -1] {
            let dto = CreateRatingDto {
                score,
                comment: None,
            };
            assert!(dto.validate().is_err(), "score {score} should be rejected");
        }
    }

    #[test]
    fn test_comment_length() {
        let dto = CreateRatingDto {
            score: 4,
            comment: Some(Sentence(3..8).fake()),
        };
        assert!(dto.validate().is_ok());

        let dto = CreateRatingDto {
            score: 4,
            comment: Some("x".repeat(1001)),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_deserializes_camel_case() {
        let dto: CreateRatingDto =
            serde_json::from_value(serde_json::json!({ "score": 5 })).unwrap();
        assert_eq!(dto.score, 5);
        assert!(dto.comment.is_none());
    }
}
