//! Verification Gate
//!
//! Manual review decisions for payment receipts and boarding documents.
//! Decisions mutate the reservation's review fields and, where the rules
//! say so, force a status move — they never trigger automatic follow-up
//! transitions (approving a receipt does not start boarding).

use serde::{Deserialize, Serialize};

use crate::db::models::{Reservation, ReservationStatus, VerifyStatus};

use super::error::BookingError;

/// Which boarding document a decision applies to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSubject {
    Id,
    Signature,
}

impl DocumentSubject {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSubject::Id => "id",
            DocumentSubject::Signature => "signature",
        }
    }
}

impl std::fmt::Display for DocumentSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn ensure_open(reservation: &Reservation) -> Result<(), BookingError> {
    if reservation.status.is_terminal() {
        return Err(BookingError::ReservationClosed(
            reservation.id_string(),
            reservation.status,
        ));
    }
    Ok(())
}

/// Apply a receipt review decision.
///
/// Approval marks the reservation `PAID` regardless of its prior
/// (non-terminal) status; rejection forces it back to `PENDING_PAYMENT`.
pub fn apply_receipt_decision(
    reservation: &mut Reservation,
    approved: bool,
    actor: &str,
    now: i64,
) -> Result<(), BookingError> {
    ensure_open(reservation)?;
    if !reservation.receipt.supplied() {
        return Err(BookingError::Validation(
            "No receipt has been uploaded for this reservation".into(),
        ));
    }

    reservation.receipt.reviewed_at = Some(now);
    reservation.receipt.reviewed_by = Some(actor.to_string());
    if approved {
        reservation.receipt.status = VerifyStatus::Approved;
        reservation.receipt.rejection_reason = None;
        reservation.status = ReservationStatus::Paid;
    } else {
        reservation.receipt.status = VerifyStatus::Rejected;
        reservation.status = ReservationStatus::PendingPayment;
    }
    Ok(())
}

/// Apply an ID / signature review decision.
///
/// A rejection requires a reason and invalidates the whole boarding
/// reservation: staff must reacquire a corrected document before
/// re-attempting, so the reservation moves to `REJECTED`. An approval
/// only flips the document's own flag — the state machine requires both
/// documents approved before boarding may start.
pub fn apply_document_decision(
    reservation: &mut Reservation,
    subject: DocumentSubject,
    approved: bool,
    rejection_reason: Option<String>,
    actor: &str,
    now: i64,
) -> Result<(), BookingError> {
    ensure_open(reservation)?;
    if !reservation.booking.is_boarding() {
        return Err(BookingError::Validation(
            "Identity documents apply to boarding reservations only".into(),
        ));
    }

    let reason = if approved {
        None
    } else {
        Some(
            rejection_reason
                .filter(|r| !r.trim().is_empty())
                .ok_or(BookingError::MissingRejectionReason)?,
        )
    };

    let document = match subject {
        DocumentSubject::Id => &mut reservation.id_document,
        DocumentSubject::Signature => &mut reservation.signature,
    };
    if !document.supplied() {
        return Err(BookingError::Validation(format!(
            "No {} document has been uploaded for this reservation",
            subject
        )));
    }

    document.reviewed_at = Some(now);
    document.reviewed_by = Some(actor.to_string());
    if approved {
        document.status = VerifyStatus::Approved;
        document.rejection_reason = None;
    } else {
        document.status = VerifyStatus::Rejected;
        document.rejection_reason = reason;
        reservation.status = ReservationStatus::Rejected;
    }
    Ok(())
}
