use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::bookings::policies::BookingStatus;
use crate::shared::constants::{ALLOWED_PROOF_CONTENT_TYPES, MAX_PROOF_PHOTO_BYTES};
use crate::shared::money::Money;

/// Which side of the job a proof photo documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProofKind {
    Before,
    After,
}

impl ProofKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProofKind::Before => "before",
            ProofKind::After => "after",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_lowercase().as_str() {
            "before" => Ok(ProofKind::Before),
            "after" => Ok(ProofKind::After),
            other => Err(AppError::BadRequest(format!(
                "Invalid proof kind '{}', expected 'before' or 'after'",
                other
            ))),
        }
    }
}

/// Validated proof-of-work upload
#[derive(Debug, Clone)]
pub struct ProofUpload {
    pub kind: ProofKind,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ProofUpload {
    pub fn new(kind: ProofKind, content_type: &str, data: Vec<u8>) -> Result<Self, AppError> {
        let content_type = content_type.trim().to_lowercase();

        if data.is_empty() {
            return Err(AppError::BadRequest("Photo is empty".to_string()));
        }
        if data.len() > MAX_PROOF_PHOTO_BYTES {
            return Err(AppError::BadRequest(format!(
                "Photo too large. Maximum size is {} MB",
                MAX_PROOF_PHOTO_BYTES / 1024 / 1024
            )));
        }
        if !ALLOWED_PROOF_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(AppError::BadRequest(format!(
                "File type '{}' is not allowed. Allowed types: {}",
                content_type,
                ALLOWED_PROOF_CONTENT_TYPES.join(", ")
            )));
        }

        Ok(Self {
            kind,
            content_type,
            data,
        })
    }

    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/heic" => "heic",
            _ => "jpg",
        }
    }
}

/// Multipart form for proof uploads, for the OpenAPI document only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadProofDto {
    /// "before" or "after"
    #[schema(example = "before")]
    pub kind: String,
    /// JPEG, PNG, WebP or HEIC image
    #[schema(format = Binary, content_media_type = "image/jpeg")]
    pub file: String,
}

/// Request DTO for an agent withdrawing from a job
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawJobDto {
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

/// A job from the agent's point of view
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentJobDto {
    /// Booking id, used in every `/api/agent/jobs/{id}` path
    pub request_id: Uuid,
    pub reference_number: String,
    pub service_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub total_price_cents: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<Uuid>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_out_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proof_kind_parse() {
        assert_eq!(ProofKind::parse("before").unwrap(), ProofKind::Before);
        assert_eq!(ProofKind::parse(" AFTER ").unwrap(), ProofKind::After);
        assert!(ProofKind::parse("during").is_err());
    }

    #[test]
    fn test_proof_upload_accepts_images() {
        let upload = ProofUpload::new(ProofKind::Before, "image/PNG", vec![1, 2, 3]).unwrap();
        assert_eq!(upload.content_type, "image/png");
        assert_eq!(upload.extension(), "png");

        let upload = ProofUpload::new(ProofKind::After, "image/jpeg", vec![1]).unwrap();
        assert_eq!(upload.extension(), "jpg");
    }

    #[test]
    fn test_proof_upload_rejects_non_images() {
        assert!(ProofUpload::new(ProofKind::Before, "application/pdf", vec![1]).is_err());
        assert!(ProofUpload::new(ProofKind::Before, "text/plain", vec![1]).is_err());
    }

    #[test]
    fn test_proof_upload_size_limits() {
        assert!(ProofUpload::new(ProofKind::Before, "image/jpeg", Vec::new()).is_err());
        assert!(
            ProofUpload::new(ProofKind::Before, "image/jpeg", vec![0; MAX_PROOF_PHOTO_BYTES]).is_ok()
        );
        assert!(ProofUpload::new(
            ProofKind::Before,
            "image/jpeg",
            vec![0; MAX_PROOF_PHOTO_BYTES + 1]
        )
        .is_err());
    }
}
