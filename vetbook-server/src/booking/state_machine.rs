//! Appointment State Machine
//!
//! The authoritative transition function. Verification gating applies only
//! at the `IN_PROGRESS` / `COMPLETED` boundary: front-desk staff may
//! acknowledge and schedule (`CONFIRMED`) before payment and documents are
//! fully reviewed, but service delivery is never recorded against an
//! unverified payment or unverified identity.

use crate::db::models::{Reservation, ReservationStatus};
use thiserror::Error;

/// Why a requested transition was refused
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot transition from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("cannot mark {target}: payment receipt not yet verified")]
    ReceiptNotVerified { target: ReservationStatus },

    #[error("cannot mark {target}: boarding documents not yet verified")]
    DocumentsNotVerified { target: ReservationStatus },
}

/// Whether entering `target` requires the verification gate
fn is_gated(target: ReservationStatus) -> bool {
    matches!(
        target,
        ReservationStatus::InProgress | ReservationStatus::Completed
    )
}

/// Evaluate the transition guards in order; the first failing guard
/// determines the error.
///
/// Guard order:
/// 1. terminal statuses permit no transition out,
/// 2. entering `IN_PROGRESS`/`COMPLETED` on a boarding reservation with
///    both documents supplied requires both approved,
/// 3. entering `IN_PROGRESS`/`COMPLETED` with a non-cash-equivalent
///    payment method requires an approved receipt.
pub fn check_transition(
    reservation: &Reservation,
    target: ReservationStatus,
) -> Result<(), TransitionError> {
    let current = reservation.status;

    if current.is_terminal() {
        return Err(TransitionError::InvalidTransition {
            from: current,
            to: target,
        });
    }

    if is_gated(target) {
        if reservation.booking.is_boarding()
            && reservation.id_document.supplied()
            && reservation.signature.supplied()
            && !(reservation.id_document.status.is_approved()
                && reservation.signature.status.is_approved())
        {
            return Err(TransitionError::DocumentsNotVerified { target });
        }

        if reservation.requires_receipt() && !reservation.receipt.status.is_approved() {
            return Err(TransitionError::ReceiptNotVerified { target });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Booking, DocumentReview, VerifyStatus};
    use chrono::NaiveDate;

    fn boarding_reservation(status: ReservationStatus) -> Reservation {
        Reservation {
            id: None,
            pets: vec!["pet:rex".parse().unwrap()],
            service: "service:boarding".parse().unwrap(),
            booking: Booking::Boarding {
                cage: "cage:c01".parse().unwrap(),
                check_in: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                check_out: NaiveDate::from_ymd_opt(2024, 6, 4).unwrap(),
            },
            payment_method: "GCash".to_string(),
            total_amount: 1750.0,
            status,
            receipt: DocumentReview::with_url(Some("https://docs/receipt.jpg".into())),
            id_document: DocumentReview::with_url(Some("https://docs/id.jpg".into())),
            signature: DocumentReview::with_url(Some("https://docs/sig.jpg".into())),
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn approve(doc: &mut DocumentReview) {
        doc.status = VerifyStatus::Approved;
    }

    #[test]
    fn terminal_statuses_are_immutable() {
        for terminal in [
            ReservationStatus::Completed,
            ReservationStatus::Rejected,
            ReservationStatus::Cancelled,
        ] {
            let res = boarding_reservation(terminal);
            for target in [
                ReservationStatus::Pending,
                ReservationStatus::Confirmed,
                ReservationStatus::InProgress,
                ReservationStatus::Cancelled,
            ] {
                assert_eq!(
                    check_transition(&res, target),
                    Err(TransitionError::InvalidTransition {
                        from: terminal,
                        to: target
                    })
                );
            }
        }
    }

    #[test]
    fn confirm_is_allowed_before_any_review() {
        let res = boarding_reservation(ReservationStatus::PendingPayment);
        assert_eq!(
            check_transition(&res, ReservationStatus::Confirmed),
            Ok(())
        );
    }

    #[test]
    fn in_progress_blocked_by_unreviewed_documents() {
        let mut res = boarding_reservation(ReservationStatus::Confirmed);
        approve(&mut res.receipt);
        assert_eq!(
            check_transition(&res, ReservationStatus::InProgress),
            Err(TransitionError::DocumentsNotVerified {
                target: ReservationStatus::InProgress
            })
        );
    }

    #[test]
    fn in_progress_blocked_by_pending_receipt() {
        let mut res = boarding_reservation(ReservationStatus::Confirmed);
        approve(&mut res.id_document);
        approve(&mut res.signature);
        // Receipt still PENDING — uploaded but not reviewed
        assert_eq!(
            check_transition(&res, ReservationStatus::InProgress),
            Err(TransitionError::ReceiptNotVerified {
                target: ReservationStatus::InProgress
            })
        );
    }

    #[test]
    fn document_guard_is_checked_before_receipt_guard() {
        let res = boarding_reservation(ReservationStatus::Confirmed);
        // Nothing reviewed at all: the document guard fires first
        assert_eq!(
            check_transition(&res, ReservationStatus::Completed),
            Err(TransitionError::DocumentsNotVerified {
                target: ReservationStatus::Completed
            })
        );
    }

    #[test]
    fn fully_verified_boarding_may_start() {
        let mut res = boarding_reservation(ReservationStatus::Paid);
        approve(&mut res.receipt);
        approve(&mut res.id_document);
        approve(&mut res.signature);
        assert_eq!(
            check_transition(&res, ReservationStatus::InProgress),
            Ok(())
        );
    }

    #[test]
    fn cash_payment_skips_receipt_guard() {
        let mut res = boarding_reservation(ReservationStatus::Confirmed);
        res.payment_method = "Cash".to_string();
        approve(&mut res.id_document);
        approve(&mut res.signature);
        assert_eq!(
            check_transition(&res, ReservationStatus::InProgress),
            Ok(())
        );
    }

    #[test]
    fn boarding_without_supplied_documents_is_not_doc_gated() {
        let mut res = boarding_reservation(ReservationStatus::Confirmed);
        res.id_document = DocumentReview::default();
        res.signature = DocumentReview::default();
        approve(&mut res.receipt);
        assert_eq!(
            check_transition(&res, ReservationStatus::InProgress),
            Ok(())
        );
    }

    #[test]
    fn regular_appointment_is_never_doc_gated() {
        let mut res = boarding_reservation(ReservationStatus::Confirmed);
        res.booking = Booking::Appointment {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        };
        approve(&mut res.receipt);
        assert_eq!(
            check_transition(&res, ReservationStatus::InProgress),
            Ok(())
        );
    }
}
