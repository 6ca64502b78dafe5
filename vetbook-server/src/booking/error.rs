//! Booking engine errors

use crate::db::models::ReservationStatus;
use crate::db::repository::RepoError;
use crate::utils::AppError;
use thiserror::Error;

use super::state_machine::TransitionError;

/// Engine-level errors
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cage conflict: {0}")]
    CageConflict(String),

    #[error("Rejection reason is required when rejecting a document")]
    MissingRejectionReason,

    /// Verification decisions are not accepted on closed reservations
    #[error("Reservation {0} is closed ({1}); no further review is possible")]
    ReservationClosed(String, ReservationStatus),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(msg) => AppError::Validation(msg),
            BookingError::NotFound(msg) => AppError::NotFound(msg),
            BookingError::CageConflict(msg) => AppError::CageConflict(msg),
            BookingError::MissingRejectionReason => AppError::MissingRejectionReason,
            BookingError::ReservationClosed(id, status) => AppError::InvalidTransition(format!(
                "Reservation {} is closed ({}); no further review is possible",
                id, status
            )),
            BookingError::Transition(e) => match &e {
                TransitionError::InvalidTransition { .. } => {
                    AppError::InvalidTransition(e.to_string())
                }
                TransitionError::ReceiptNotVerified { .. } => {
                    AppError::ReceiptNotVerified(e.to_string())
                }
                TransitionError::DocumentsNotVerified { .. } => {
                    AppError::DocumentsNotVerified(e.to_string())
                }
            },
            BookingError::Repo(e) => e.into(),
        }
    }
}
