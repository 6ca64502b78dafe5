//! Reservation Model
//!
//! 预约主实体：普通门诊预约与寄养预约共用一张表，
//! 由 [`Booking`] 标签联合体区分，而不是探测可空字段。

use super::serde_helpers;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

// =============================================================================
// Status
// =============================================================================

/// Reservation status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    PendingPayment,
    Confirmed,
    Paid,
    InProgress,
    Completed,
    Rejected,
    Cancelled,
}

impl ReservationStatus {
    /// Statuses that occupy a cage for overlap purposes
    pub const ACTIVE: [ReservationStatus; 5] = [
        ReservationStatus::Pending,
        ReservationStatus::PendingPayment,
        ReservationStatus::Confirmed,
        ReservationStatus::Paid,
        ReservationStatus::InProgress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::PendingPayment => "PENDING_PAYMENT",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Paid => "PAID",
            ReservationStatus::InProgress => "IN_PROGRESS",
            ReservationStatus::Completed => "COMPLETED",
            ReservationStatus::Rejected => "REJECTED",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    /// Terminal statuses permit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Completed
                | ReservationStatus::Rejected
                | ReservationStatus::Cancelled
        )
    }

    /// Active set as owned strings, for query binds
    pub fn active_set() -> Vec<String> {
        Self::ACTIVE.iter().map(|s| s.as_str().to_string()).collect()
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Verification (tri-state)
// =============================================================================

/// Tri-state review outcome.
///
/// "未审核" 与 "已驳回" 是两种不同的业务状态，不能折叠成 bool。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerifyStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl VerifyStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, VerifyStatus::Approved)
    }
}

/// A reviewable document reference (receipt, ID, signature).
///
/// The engine stores only the opaque URL handed back by the document
/// store, never the bytes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentReview {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: VerifyStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<i64>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
}

impl DocumentReview {
    pub fn with_url(url: Option<String>) -> Self {
        Self {
            url,
            ..Default::default()
        }
    }

    /// Whether a document was uploaded at all
    pub fn supplied(&self) -> bool {
        self.url.is_some()
    }
}

// =============================================================================
// Booking slot (the discriminator)
// =============================================================================

/// What is being booked: a single-instant appointment or a boarding stay.
///
/// 唯一的判别来源。序列化为 `{ "kind": "BOARDING", ... }`，
/// 档期查询按 `booking.kind` / `booking.cage` / `booking.check_in` 过滤。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Booking {
    Appointment {
        date: NaiveDate,
        time: NaiveTime,
    },
    Boarding {
        #[serde(with = "serde_helpers::record_id")]
        cage: RecordId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
}

impl Booking {
    pub fn is_boarding(&self) -> bool {
        matches!(self, Booking::Boarding { .. })
    }

    pub fn cage(&self) -> Option<&RecordId> {
        match self {
            Booking::Boarding { cage, .. } => Some(cage),
            Booking::Appointment { .. } => None,
        }
    }

    /// Number of boarded nights, by calendar date (`check_out - check_in`)
    pub fn boarding_days(&self) -> Option<i64> {
        match self {
            Booking::Boarding {
                check_in,
                check_out,
                ..
            } => Some((*check_out - *check_in).num_days()),
            Booking::Appointment { .. } => None,
        }
    }
}

// =============================================================================
// Reservation (主表)
// =============================================================================

/// Reservation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Pets sharing this reservation (multi-pet group bookings)
    #[serde(with = "serde_helpers::vec_record_id")]
    pub pets: Vec<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub service: RecordId,
    pub booking: Booking,
    pub payment_method: String,
    /// Denormalized for display; always recomputable by the pricing
    /// calculator from the persisted fields
    pub total_amount: f64,
    pub status: ReservationStatus,
    /// Payment receipt review
    #[serde(default)]
    pub receipt: DocumentReview,
    /// Boarding only: owner ID document review
    #[serde(default)]
    pub id_document: DocumentReview,
    /// Boarding only: contract signature review
    #[serde(default)]
    pub signature: DocumentReview,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Reservation {
    /// Whether the payment method is exempt from receipt review
    pub fn requires_receipt(&self) -> bool {
        !is_cash_equivalent(&self.payment_method)
    }

    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}

/// Cash-equivalent payment methods settle at the front desk and need no
/// receipt review. Everything else (GCash, PayMaya, bank transfer, card)
/// is reviewed manually from an uploaded receipt image.
pub fn is_cash_equivalent(method: &str) -> bool {
    method.trim().eq_ignore_ascii_case("cash")
}

// =============================================================================
// API Request Types
// =============================================================================

/// Create reservation payload.
///
/// The wire format mirrors the booking form: either the appointment pair
/// or the cage/check-in/check-out triple is populated. Dates arrive as
/// strings and are parsed by the engine so that malformed input surfaces
/// as a validation error, not a serde failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub pet_ids: Vec<String>,
    pub service_id: String,
    pub payment_method: String,
    // Regular appointment slot
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    // Boarding slot
    pub cage_id: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    // Document references from the external document store
    pub receipt_url: Option<String>,
    pub id_document_url: Option<String>,
    pub signature_url: Option<String>,
    pub notes: Option<String>,
}

/// Admin edit payload: allowed only before boarding starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationUpdate {
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    /// Reassign the boarding cage (re-validated against the schedule)
    pub cage_id: Option<String>,
    pub service_id: Option<String>,
}
