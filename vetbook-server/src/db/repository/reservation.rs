//! Reservation Repository
//!
//! Plain row storage plus the schedule-overlap queries the booking engine
//! builds on. The atomicity of "check overlap, then insert" is provided one
//! layer up by the engine's per-cage locks — this repository only runs the
//! queries.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Reservation, ReservationStatus};
use chrono::NaiveDate;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const TABLE: &str = "reservation";

#[derive(Clone)]
pub struct ReservationRepository {
    base: BaseRepository,
}

impl ReservationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// List reservations, newest first, optionally filtered by status
    /// and/or by a participating pet
    pub async fn find_all(
        &self,
        status: Option<ReservationStatus>,
        pet_id: Option<&str>,
    ) -> RepoResult<Vec<Reservation>> {
        let mut sql = String::from("SELECT * FROM reservation");
        let mut clauses: Vec<&str> = Vec::new();
        if status.is_some() {
            clauses.push("status = $status");
        }
        if pet_id.is_some() {
            clauses.push("$pet IN pets");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = self.base.db().query(sql);
        if let Some(s) = status {
            query = query.bind(("status", s.as_str()));
        }
        if let Some(pet) = pet_id {
            let pet_thing = self.base.parse_id(pet)?;
            query = query.bind(("pet", pet_thing.to_string()));
        }
        let reservations: Vec<Reservation> = query.await?.take(0)?;
        Ok(reservations)
    }

    /// Find reservation by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Reservation>> {
        let thing = self.base.parse_id(id)?;
        let reservation: Option<Reservation> = self.base.db().select(thing).await?;
        Ok(reservation)
    }

    /// Insert a new reservation row
    pub async fn create(&self, mut data: Reservation) -> RepoResult<Reservation> {
        data.id = None;
        let created: Option<Reservation> = self.base.db().create(TABLE).content(data).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create reservation".to_string()))
    }

    /// Replace the whole reservation row (engine-level read-modify-write)
    pub async fn replace(&self, id: &str, mut data: Reservation) -> RepoResult<Reservation> {
        let thing = self.base.parse_id(id)?;
        data.id = None;
        let updated: Option<Reservation> = self.base.db().update(thing).content(data).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Reservation {} not found", id)))
    }

    /// Hard delete a reservation
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = self.base.parse_id(id)?;
        if self.find_by_id(id).await?.is_none() {
            return Err(RepoError::NotFound(format!("Reservation {} not found", id)));
        }
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Active reservations on `cage` whose `[check_in, check_out)` range
    /// overlaps the given half-open range.
    ///
    /// ISO dates compare lexicographically, so the stored string dates are
    /// ordered correctly by `<` / `>`.
    pub async fn find_overlapping(
        &self,
        cage: &RecordId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude: Option<&RecordId>,
    ) -> RepoResult<Vec<Reservation>> {
        let mut sql = String::from(
            "SELECT * FROM reservation \
             WHERE booking.kind = 'BOARDING' \
             AND booking.cage = $cage \
             AND status IN $active \
             AND booking.check_in < $check_out \
             AND booking.check_out > $check_in",
        );
        if exclude.is_some() {
            sql.push_str(" AND id != $exclude");
        }

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("cage", cage.to_string()))
            .bind(("active", ReservationStatus::active_set()))
            .bind(("check_in", check_in.to_string()))
            .bind(("check_out", check_out.to_string()));
        if let Some(ex) = exclude {
            query = query.bind(("exclude", ex.clone()));
        }

        let overlapping: Vec<Reservation> = query.await?.take(0)?;
        Ok(overlapping)
    }

    /// Cage ids occupied by any active reservation overlapping the range
    pub async fn occupied_cages(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> RepoResult<Vec<String>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT VALUE booking.cage FROM reservation \
                 WHERE booking.kind = 'BOARDING' \
                 AND status IN $active \
                 AND booking.check_in < $check_out \
                 AND booking.check_out > $check_in",
            )
            .bind(("active", ReservationStatus::active_set()))
            .bind(("check_in", check_in.to_string()))
            .bind(("check_out", check_out.to_string()))
            .await?;
        let cages: Vec<String> = result.take(0)?;
        Ok(cages)
    }
}
