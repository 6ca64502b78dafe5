//! Availability Resolver
//!
//! Read-only: safe to call repeatedly while the client edits the date
//! range. Nothing is reserved here — the authoritative overlap check runs
//! again inside [`super::store::BookingStore::create`] under the cage
//! lock.

use chrono::NaiveDate;
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Cage, CageType};
use crate::db::repository::{CageRepository, ReservationRepository};

use super::error::BookingError;
use super::pricing;

/// A free cage annotated with the computed stay charge
#[derive(Debug, Clone, Serialize)]
pub struct CageAvailability {
    pub cage: Cage,
    /// `daily_rate × days` for the requested range
    pub total_amount: f64,
}

#[derive(Clone)]
pub struct AvailabilityResolver {
    cages: CageRepository,
    reservations: ReservationRepository,
}

impl AvailabilityResolver {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            cages: CageRepository::new(db.clone()),
            reservations: ReservationRepository::new(db),
        }
    }

    /// Cages with no overlapping active reservation in
    /// `[check_in, check_out)`, optionally narrowed by cage type.
    ///
    /// Comparison is by calendar date. The administrative cage status is
    /// deliberately not consulted: it is an independent staff-facing
    /// signal, not a schedule.
    pub async fn find_available_cages(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        cage_type: Option<CageType>,
    ) -> Result<Vec<CageAvailability>, BookingError> {
        if check_out <= check_in {
            return Err(BookingError::Validation(
                "check_out_date must be after check_in_date".into(),
            ));
        }

        let occupied = self.reservations.occupied_cages(check_in, check_out).await?;
        let days = (check_out - check_in).num_days();

        let cages = self.cages.find_all(None, cage_type).await?;
        let available = cages
            .into_iter()
            .filter(|cage| {
                cage.id
                    .as_ref()
                    .is_some_and(|id| !occupied.contains(&id.to_string()))
            })
            .map(|cage| {
                let total_amount = pricing::boarding_charge(cage.daily_rate, days);
                CageAvailability { cage, total_amount }
            })
            .collect();
        Ok(available)
    }
}
