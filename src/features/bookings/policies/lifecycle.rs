//! Booking lifecycle state machine.
//!
//! `transition` is the only place that decides whether an action is legal in
//! a given status. Services persist the returned status; views derive the
//! list of available actions from the same function.

use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

use crate::core::error::AppError;

/// Booking status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Assigned,
    InProgress,
    PendingVerification,
    Verified,
    Paid,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Assigned => "assigned",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::PendingVerification => "pending_verification",
            BookingStatus::Verified => "verified",
            BookingStatus::Paid => "paid",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Confirm,
    Assign,
    Withdraw,
    CheckIn,
    UploadProof,
    CheckOut,
    Verify,
    RejectProof,
    MarkPaid,
    Complete,
    Cancel,
    Rate,
}

impl BookingAction {
    pub const ALL: [BookingAction; 12] = [
        BookingAction::Confirm,
        BookingAction::Assign,
        BookingAction::Withdraw,
        BookingAction::CheckIn,
        BookingAction::UploadProof,
        BookingAction::CheckOut,
        BookingAction::Verify,
        BookingAction::RejectProof,
        BookingAction::MarkPaid,
        BookingAction::Complete,
        BookingAction::Cancel,
        BookingAction::Rate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingAction::Confirm => "confirm",
            BookingAction::Assign => "assign",
            BookingAction::Withdraw => "withdraw",
            BookingAction::CheckIn => "check_in",
            BookingAction::UploadProof => "upload_proof",
            BookingAction::CheckOut => "check_out",
            BookingAction::Verify => "verify",
            BookingAction::RejectProof => "reject_proof",
            BookingAction::MarkPaid => "mark_paid",
            BookingAction::Complete => "complete",
            BookingAction::Cancel => "cancel",
            BookingAction::Rate => "rate",
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress flags of the active job assignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobProgress {
    pub checked_in: bool,
    pub has_before_photo: bool,
    pub has_after_photo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Cannot {action} a booking that is {from}")]
    InvalidTransition {
        from: BookingStatus,
        action: BookingAction,
    },

    #[error("Check in before uploading proof photos")]
    NotCheckedIn,

    #[error("Upload both before and after photos before checking out")]
    MissingProofPhotos,
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Apply `action` to a booking in `from`, returning the next status
pub fn transition(
    from: BookingStatus,
    action: BookingAction,
    progress: JobProgress,
) -> Result<BookingStatus, LifecycleError> {
    use BookingAction as A;
    use BookingStatus as S;

    let next = match (from, action) {
        (S::Pending, A::Confirm) => S::Confirmed,
        (S::Pending | S::Confirmed, A::Assign) => S::Assigned,
        (S::Assigned, A::Withdraw) => S::Confirmed,
        (S::Assigned, A::CheckIn) => S::InProgress,
        (S::InProgress, A::UploadProof) => {
            if !progress.checked_in {
                return Err(LifecycleError::NotCheckedIn);
            }
            S::InProgress
        }
        (S::InProgress, A::CheckOut) => {
            if !(progress.has_before_photo && progress.has_after_photo) {
                return Err(LifecycleError::MissingProofPhotos);
            }
            S::PendingVerification
        }
        (S::PendingVerification, A::Verify) => S::Verified,
        (S::PendingVerification, A::RejectProof) => S::InProgress,
        (S::Verified, A::MarkPaid) => S::Paid,
        (S::Verified | S::Paid, A::Complete) => S::Completed,
        (S::Pending | S::Confirmed | S::Assigned, A::Cancel) => S::Cancelled,
        (S::Completed, A::Rate) => S::Completed,
        _ => return Err(LifecycleError::InvalidTransition { from, action }),
    };

    Ok(next)
}

pub fn allowed_actions(status: BookingStatus, progress: JobProgress) -> Vec<BookingAction> {
    BookingAction::ALL
        .into_iter()
        .filter(|action| transition(status, *action, progress).is_ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingAction as A;
    use BookingStatus as S;

    const NONE: JobProgress = JobProgress {
        checked_in: false,
        has_before_photo: false,
        has_after_photo: false,
    };

    const CHECKED_IN: JobProgress = JobProgress {
        checked_in: true,
        has_before_photo: false,
        has_after_photo: false,
    };

    const BOTH_PHOTOS: JobProgress = JobProgress {
        checked_in: true,
        has_before_photo: true,
        has_after_photo: true,
    };

    #[test]
    fn test_happy_path() {
        let mut status = S::Pending;
        for (action, progress, expected) in [
            (A::Confirm, NONE, S::Confirmed),
            (A::Assign, NONE, S::Assigned),
            (A::CheckIn, NONE, S::InProgress),
            (A::UploadProof, CHECKED_IN, S::InProgress),
            (A::CheckOut, BOTH_PHOTOS, S::PendingVerification),
            (A::Verify, BOTH_PHOTOS, S::Verified),
            (A::MarkPaid, BOTH_PHOTOS, S::Paid),
            (A::Complete, BOTH_PHOTOS, S::Completed),
            (A::Rate, BOTH_PHOTOS, S::Completed),
        ] {
            status = transition(status, action, progress).unwrap();
            assert_eq!(status, expected, "after {}", action);
        }
    }

    #[test]
    fn test_assign_straight_from_pending() {
        assert_eq!(transition(S::Pending, A::Assign, NONE), Ok(S::Assigned));
    }

    #[test]
    fn test_complete_without_payment_step() {
        assert_eq!(transition(S::Verified, A::Complete, NONE), Ok(S::Completed));
    }

    #[test]
    fn test_withdraw_returns_to_confirmed() {
        assert_eq!(transition(S::Assigned, A::Withdraw, NONE), Ok(S::Confirmed));
        assert!(transition(S::InProgress, A::Withdraw, CHECKED_IN).is_err());
    }

    #[test]
    fn test_reject_proof_reopens_job() {
        assert_eq!(
            transition(S::PendingVerification, A::RejectProof, BOTH_PHOTOS),
            Ok(S::InProgress)
        );
    }

    #[test]
    fn test_upload_requires_check_in() {
        assert_eq!(
            transition(S::InProgress, A::UploadProof, NONE),
            Err(LifecycleError::NotCheckedIn)
        );
    }

    #[test]
    fn test_checkout_requires_both_photos() {
        let before_only = JobProgress {
            checked_in: true,
            has_before_photo: true,
            has_after_photo: false,
        };
        assert_eq!(
            transition(S::InProgress, A::CheckOut, before_only),
            Err(LifecycleError::MissingProofPhotos)
        );
        assert_eq!(
            transition(S::InProgress, A::CheckOut, CHECKED_IN),
            Err(LifecycleError::MissingProofPhotos)
        );
    }

    #[test]
    fn test_cancel_only_before_work_starts() {
        for status in [S::Pending, S::Confirmed, S::Assigned] {
            assert_eq!(transition(status, A::Cancel, NONE), Ok(S::Cancelled));
        }
        for status in [
            S::InProgress,
            S::PendingVerification,
            S::Verified,
            S::Paid,
            S::Completed,
            S::Cancelled,
        ] {
            assert!(transition(status, A::Cancel, NONE).is_err(), "{}", status);
        }
    }

    #[test]
    fn test_rate_only_completed() {
        for status in [S::Pending, S::InProgress, S::Verified, S::Paid, S::Cancelled] {
            assert!(transition(status, A::Rate, BOTH_PHOTOS).is_err());
        }
    }

    #[test]
    fn test_terminal_states_have_no_forward_moves() {
        assert!(allowed_actions(S::Cancelled, BOTH_PHOTOS).is_empty());
        assert_eq!(allowed_actions(S::Completed, BOTH_PHOTOS), vec![A::Rate]);
    }

    #[test]
    fn test_allowed_actions_follow_transition() {
        assert_eq!(
            allowed_actions(S::Pending, NONE),
            vec![A::Confirm, A::Assign, A::Cancel]
        );
        assert_eq!(
            allowed_actions(S::Assigned, NONE),
            vec![A::Withdraw, A::CheckIn, A::Cancel]
        );
        assert!(allowed_actions(S::InProgress, NONE).is_empty());
        assert_eq!(allowed_actions(S::InProgress, CHECKED_IN), vec![A::UploadProof]);
        assert_eq!(
            allowed_actions(S::InProgress, BOTH_PHOTOS),
            vec![A::UploadProof, A::CheckOut]
        );
        assert_eq!(
            allowed_actions(S::Verified, NONE),
            vec![A::MarkPaid, A::Complete]
        );
    }

    #[test]
    fn test_error_maps_to_bad_request() {
        let err = transition(S::Completed, A::Cancel, NONE).unwrap_err();
        assert_eq!(err.to_string(), "Cannot cancel a booking that is completed");

        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::BadRequest(_)));
    }
}
