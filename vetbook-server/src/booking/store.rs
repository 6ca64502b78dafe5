//! Booking Store
//!
//! 预约写入口。所有写操作在这里串行化：
//! - 创建/换笼时按笼位加锁，在锁内重跑档期查询再写入 —
//!   "查可用 → 用户挑选 → 提交" 之间的 check-then-act 竞争在此收口，
//!   输掉的一方得到 `CageConflict`；
//! - 状态流转与审核决定按预约加锁，读-改-写不会交错。
//!
//! 锁只在单次调用内持有，不同预约之间的操作互不阻塞。

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use dashmap::DashMap;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use tokio::sync::Mutex;

use crate::db::models::{
    Booking, DocumentReview, Reservation, ReservationCreate, ReservationStatus,
    ReservationUpdate, ServiceCategory, is_cash_equivalent,
};
use crate::db::repository::{
    CageRepository, PetRepository, ReservationRepository, ServiceRepository,
};
use crate::utils::time::now_millis;
use crate::utils::validation::MAX_NOTE_LEN;

use super::error::BookingError;
use super::events::{DomainEvent, EventBus};
use super::state_machine;
use super::verification::{self, DocumentSubject};

type LockTable = Arc<DashMap<String, Arc<Mutex<()>>>>;

#[derive(Clone)]
pub struct BookingStore {
    reservations: ReservationRepository,
    cages: CageRepository,
    services: ServiceRepository,
    pets: PetRepository,
    cage_locks: LockTable,
    reservation_locks: LockTable,
    events: EventBus,
}

fn lock_handle(locks: &LockTable, key: &str) -> Arc<Mutex<()>> {
    locks
        .entry(key.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

fn parse_date_field(value: &Option<String>, field: &str) -> Result<NaiveDate, BookingError> {
    let raw = value
        .as_deref()
        .ok_or_else(|| BookingError::Validation(format!("{field} is required")))?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| BookingError::Validation(format!("Invalid {field}: {raw}")))
}

fn parse_time_field(value: &Option<String>, field: &str) -> Result<NaiveTime, BookingError> {
    let raw = value
        .as_deref()
        .ok_or_else(|| BookingError::Validation(format!("{field} is required")))?;
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| BookingError::Validation(format!("Invalid {field}: {raw}")))
}

impl BookingStore {
    pub fn new(db: Surreal<Db>, events: EventBus) -> Self {
        Self {
            reservations: ReservationRepository::new(db.clone()),
            cages: CageRepository::new(db.clone()),
            services: ServiceRepository::new(db.clone()),
            pets: PetRepository::new(db),
            cage_locks: Arc::new(DashMap::new()),
            reservation_locks: Arc::new(DashMap::new()),
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Create a reservation from a booking request.
    ///
    /// For boarding the overlap condition is re-validated under the cage
    /// lock, atomically with the insert — an earlier availability read is
    /// never trusted.
    pub async fn create(&self, req: ReservationCreate) -> Result<Reservation, BookingError> {
        if req.pet_ids.is_empty() {
            return Err(BookingError::Validation(
                "At least one pet is required".into(),
            ));
        }
        if req.payment_method.trim().is_empty() {
            return Err(BookingError::Validation(
                "payment_method must not be empty".into(),
            ));
        }
        if let Some(notes) = &req.notes
            && notes.len() > MAX_NOTE_LEN
        {
            return Err(BookingError::Validation(format!(
                "notes is too long ({} chars, max {MAX_NOTE_LEN})",
                notes.len()
            )));
        }

        // Pets must exist in the client directory
        let mut pet_refs: Vec<RecordId> = Vec::with_capacity(req.pet_ids.len());
        for id in &req.pet_ids {
            pet_refs.push(
                id.parse()
                    .map_err(|_| BookingError::Validation(format!("Invalid pet id: {id}")))?,
            );
        }
        self.pets.find_by_ids(&req.pet_ids).await?;

        let service_ref: RecordId = req
            .service_id
            .parse()
            .map_err(|_| BookingError::Validation(format!("Invalid service id: {}", req.service_id)))?;
        let service = self
            .services
            .find_by_id(&req.service_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Service {} not found", req.service_id)))?;
        if !service.is_active {
            return Err(BookingError::Validation(format!(
                "Service '{}' is not bookable",
                service.name
            )));
        }

        // The presence of a cage decides which side of the union this is
        let (booking, boarding_charge) = if let Some(cage_id) = &req.cage_id {
            if req.appointment_date.is_some() || req.appointment_time.is_some() {
                return Err(BookingError::Validation(
                    "Provide either an appointment slot or a boarding range, not both".into(),
                ));
            }
            if service.category != ServiceCategory::Boarding {
                return Err(BookingError::Validation(format!(
                    "Service '{}' is not a boarding service",
                    service.name
                )));
            }
            let check_in = parse_date_field(&req.check_in_date, "check_in_date")?;
            let check_out = parse_date_field(&req.check_out_date, "check_out_date")?;
            if check_out <= check_in {
                return Err(BookingError::Validation(
                    "check_out_date must be after check_in_date".into(),
                ));
            }
            let cage_ref: RecordId = cage_id
                .parse()
                .map_err(|_| BookingError::Validation(format!("Invalid cage id: {cage_id}")))?;
            let cage = self
                .cages
                .find_by_id(cage_id)
                .await?
                .ok_or_else(|| BookingError::NotFound(format!("Cage {cage_id} not found")))?;
            let days = (check_out - check_in).num_days();
            (
                Booking::Boarding {
                    cage: cage_ref,
                    check_in,
                    check_out,
                },
                Some((cage.daily_rate, days)),
            )
        } else {
            if req.check_in_date.is_some() || req.check_out_date.is_some() {
                return Err(BookingError::Validation(
                    "check-in/check-out dates require a cage".into(),
                ));
            }
            if req.id_document_url.is_some() || req.signature_url.is_some() {
                return Err(BookingError::Validation(
                    "Identity documents apply to boarding reservations only".into(),
                ));
            }
            if service.category != ServiceCategory::Regular {
                return Err(BookingError::Validation(format!(
                    "Service '{}' is a boarding service; pick a cage and date range",
                    service.name
                )));
            }
            let date = parse_date_field(&req.appointment_date, "appointment_date")?;
            let time = parse_time_field(&req.appointment_time, "appointment_time")?;
            (Booking::Appointment { date, time }, None)
        };

        let total_amount =
            super::pricing::compute_total(service.price, pet_refs.len() as u32, boarding_charge);

        // A receipt supplied up front (or a cash-equivalent method) skips
        // the payment-pending stage
        let status = if req.receipt_url.is_some() || is_cash_equivalent(&req.payment_method) {
            ReservationStatus::Pending
        } else {
            ReservationStatus::PendingPayment
        };

        let now = now_millis();
        let reservation = Reservation {
            id: None,
            pets: pet_refs,
            service: service_ref,
            booking,
            payment_method: req.payment_method,
            total_amount,
            status,
            receipt: DocumentReview::with_url(req.receipt_url),
            id_document: DocumentReview::with_url(req.id_document_url),
            signature: DocumentReview::with_url(req.signature_url),
            notes: req.notes,
            created_at: now,
            updated_at: now,
        };

        let created = match &reservation.booking {
            Booking::Boarding {
                cage,
                check_in,
                check_out,
            } => {
                let lock = lock_handle(&self.cage_locks, &cage.to_string());
                let _guard = lock.lock().await;
                let overlapping = self
                    .reservations
                    .find_overlapping(cage, *check_in, *check_out, None)
                    .await?;
                if !overlapping.is_empty() {
                    return Err(BookingError::CageConflict(format!(
                        "Cage {cage} is already reserved between {check_in} and {check_out}"
                    )));
                }
                self.reservations.create(reservation).await?
            }
            Booking::Appointment { .. } => self.reservations.create(reservation).await?,
        };

        let id = created.id_string();
        tracing::info!(
            target: "booking",
            reservation = %id,
            status = %created.status,
            boarding = created.booking.is_boarding(),
            "Reservation created"
        );
        self.events.publish(DomainEvent::ReservationCreated {
            reservation_id: id.clone(),
            boarding: created.booking.is_boarding(),
            status: created.status,
        });
        if created.booking.is_boarding() {
            self.events
                .publish(DomainEvent::ContractRequested { reservation_id: id });
        }
        Ok(created)
    }

    // =========================================================================
    // Status transitions
    // =========================================================================

    /// Apply a status transition after the state machine's guards pass
    pub async fn request_transition(
        &self,
        id: &str,
        target: ReservationStatus,
        actor: &str,
    ) -> Result<Reservation, BookingError> {
        let lock = lock_handle(&self.reservation_locks, id);
        let _guard = lock.lock().await;

        let mut reservation = self.load(id).await?;
        state_machine::check_transition(&reservation, target)?;

        let from = reservation.status;
        reservation.status = target;
        reservation.updated_at = now_millis();
        let updated = self.reservations.replace(id, reservation).await?;

        tracing::info!(
            target: "booking",
            reservation = %id,
            from = %from,
            to = %target,
            actor = %actor,
            "Status changed"
        );
        self.events.publish(DomainEvent::ReservationStatusChanged {
            reservation_id: id.to_string(),
            from,
            to: target,
        });
        Ok(updated)
    }

    // =========================================================================
    // Verification decisions
    // =========================================================================

    /// Record a receipt review decision
    pub async fn decide_receipt(
        &self,
        id: &str,
        approved: bool,
        actor: &str,
    ) -> Result<Reservation, BookingError> {
        let lock = lock_handle(&self.reservation_locks, id);
        let _guard = lock.lock().await;

        let mut reservation = self.load(id).await?;
        verification::apply_receipt_decision(&mut reservation, approved, actor, now_millis())?;
        reservation.updated_at = now_millis();
        let updated = self.reservations.replace(id, reservation).await?;

        tracing::info!(
            target: "booking",
            reservation = %id,
            approved,
            actor = %actor,
            "Receipt reviewed"
        );
        self.events.publish(DomainEvent::ReceiptReviewed {
            reservation_id: id.to_string(),
            approved,
            status: updated.status,
        });
        Ok(updated)
    }

    /// Record an ID / signature review decision
    pub async fn decide_document(
        &self,
        id: &str,
        subject: DocumentSubject,
        approved: bool,
        rejection_reason: Option<String>,
        actor: &str,
    ) -> Result<Reservation, BookingError> {
        let lock = lock_handle(&self.reservation_locks, id);
        let _guard = lock.lock().await;

        let mut reservation = self.load(id).await?;
        verification::apply_document_decision(
            &mut reservation,
            subject,
            approved,
            rejection_reason,
            actor,
            now_millis(),
        )?;
        reservation.updated_at = now_millis();
        let updated = self.reservations.replace(id, reservation).await?;

        tracing::info!(
            target: "booking",
            reservation = %id,
            subject = %subject,
            approved,
            actor = %actor,
            "Document reviewed"
        );
        self.events.publish(DomainEvent::DocumentReviewed {
            reservation_id: id.to_string(),
            subject,
            approved,
            status: updated.status,
        });
        Ok(updated)
    }

    // =========================================================================
    // Admin edits / delete
    // =========================================================================

    /// Edit notes, payment method or cage/service references.
    /// Refused once the stay has started or the reservation is closed.
    pub async fn update_details(
        &self,
        id: &str,
        patch: ReservationUpdate,
        actor: &str,
    ) -> Result<Reservation, BookingError> {
        let lock = lock_handle(&self.reservation_locks, id);
        let _guard = lock.lock().await;

        let mut reservation = self.load(id).await?;
        if reservation.status.is_terminal()
            || reservation.status == ReservationStatus::InProgress
        {
            return Err(BookingError::Validation(format!(
                "Reservation can no longer be edited ({})",
                reservation.status
            )));
        }

        if let Some(method) = patch.payment_method {
            if method.trim().is_empty() {
                return Err(BookingError::Validation(
                    "payment_method must not be empty".into(),
                ));
            }
            reservation.payment_method = method;
        }
        if let Some(notes) = patch.notes {
            if notes.len() > MAX_NOTE_LEN {
                return Err(BookingError::Validation(format!(
                    "notes is too long ({} chars, max {MAX_NOTE_LEN})",
                    notes.len()
                )));
            }
            reservation.notes = Some(notes);
        }

        if let Some(service_id) = patch.service_id {
            let service = self
                .services
                .find_by_id(&service_id)
                .await?
                .ok_or_else(|| BookingError::NotFound(format!("Service {service_id} not found")))?;
            let expected = if reservation.booking.is_boarding() {
                ServiceCategory::Boarding
            } else {
                ServiceCategory::Regular
            };
            if service.category != expected {
                return Err(BookingError::Validation(format!(
                    "Service '{}' does not match the booking kind",
                    service.name
                )));
            }
            reservation.service = service_id
                .parse()
                .map_err(|_| BookingError::Validation(format!("Invalid service id: {service_id}")))?;
        }

        if let Some(cage_id) = patch.cage_id {
            let Booking::Boarding {
                cage,
                check_in,
                check_out,
            } = &mut reservation.booking
            else {
                return Err(BookingError::Validation(
                    "Only boarding reservations have a cage".into(),
                ));
            };
            let new_ref: RecordId = cage_id
                .parse()
                .map_err(|_| BookingError::Validation(format!("Invalid cage id: {cage_id}")))?;
            self.cages
                .find_by_id(&cage_id)
                .await?
                .ok_or_else(|| BookingError::NotFound(format!("Cage {cage_id} not found")))?;

            let exclude = reservation.id.clone();
            let cage_lock = lock_handle(&self.cage_locks, &new_ref.to_string());
            let _cage_guard = cage_lock.lock().await;
            let overlapping = self
                .reservations
                .find_overlapping(&new_ref, *check_in, *check_out, exclude.as_ref())
                .await?;
            if !overlapping.is_empty() {
                return Err(BookingError::CageConflict(format!(
                    "Cage {new_ref} is already reserved between {check_in} and {check_out}"
                )));
            }
            *cage = new_ref;
        }

        // Totals always follow the current references
        let service = self
            .services
            .find_by_id(&reservation.service.to_string())
            .await?
            .ok_or_else(|| {
                BookingError::NotFound(format!("Service {} not found", reservation.service))
            })?;
        let boarding_charge = match &reservation.booking {
            Booking::Boarding { cage, .. } => {
                let cage = self
                    .cages
                    .find_by_id(&cage.to_string())
                    .await?
                    .ok_or_else(|| BookingError::NotFound(format!("Cage {cage} not found")))?;
                Some((
                    cage.daily_rate,
                    reservation.booking.boarding_days().unwrap_or(0),
                ))
            }
            Booking::Appointment { .. } => None,
        };
        reservation.total_amount = super::pricing::compute_total(
            service.price,
            reservation.pets.len() as u32,
            boarding_charge,
        );
        reservation.updated_at = now_millis();

        let updated = self.reservations.replace(id, reservation).await?;
        tracing::info!(target: "booking", reservation = %id, actor = %actor, "Reservation edited");
        self.events.publish(DomainEvent::ReservationUpdated {
            reservation_id: id.to_string(),
        });
        Ok(updated)
    }

    /// Hard delete (admin only)
    pub async fn delete(&self, id: &str) -> Result<bool, BookingError> {
        let lock = lock_handle(&self.reservation_locks, id);
        {
            let _guard = lock.lock().await;
            self.reservations.delete(id).await?;
        }
        self.reservation_locks.remove(id);

        tracing::info!(target: "booking", reservation = %id, "Reservation deleted");
        self.events.publish(DomainEvent::ReservationDeleted {
            reservation_id: id.to_string(),
        });
        Ok(true)
    }

    async fn load(&self, id: &str) -> Result<Reservation, BookingError> {
        self.reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Reservation {id} not found")))
    }
}
