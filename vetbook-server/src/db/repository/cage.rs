//! Cage Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Cage, CageCreate, CageStatus, CageType, CageUpdate};
use crate::db::models::ReservationStatus;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "cage";

#[derive(Clone)]
pub struct CageRepository {
    base: BaseRepository,
}

impl CageRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find cages, optionally filtered by administrative status and type
    pub async fn find_all(
        &self,
        status: Option<CageStatus>,
        cage_type: Option<CageType>,
    ) -> RepoResult<Vec<Cage>> {
        let mut sql = String::from("SELECT * FROM cage");
        let mut clauses: Vec<&str> = Vec::new();
        if status.is_some() {
            clauses.push("status = $status");
        }
        if cage_type.is_some() {
            clauses.push("cage_type = $cage_type");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY cage_number");

        let mut query = self.base.db().query(sql);
        if let Some(s) = status {
            query = query.bind(("status", s.as_str()));
        }
        if let Some(t) = cage_type {
            query = query.bind(("cage_type", t.as_str()));
        }
        let cages: Vec<Cage> = query.await?.take(0)?;
        Ok(cages)
    }

    /// Find cage by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Cage>> {
        let thing = self.base.parse_id(id)?;
        let cage: Option<Cage> = self.base.db().select(thing).await?;
        Ok(cage)
    }

    /// Find cage by its unique number
    pub async fn find_by_number(&self, cage_number: &str) -> RepoResult<Option<Cage>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cage WHERE cage_number = $number LIMIT 1")
            .bind(("number", cage_number.to_string()))
            .await?;
        let cages: Vec<Cage> = result.take(0)?;
        Ok(cages.into_iter().next())
    }

    /// Create a new cage
    pub async fn create(&self, data: CageCreate) -> RepoResult<Cage> {
        if data.cage_number.trim().is_empty() {
            return Err(RepoError::Validation("cage_number must not be empty".into()));
        }
        if data.daily_rate < 0.0 {
            return Err(RepoError::Validation("daily_rate must be >= 0".into()));
        }
        let capacity = data.capacity.unwrap_or(1);
        if capacity < 1 {
            return Err(RepoError::Validation("capacity must be >= 1".into()));
        }

        // Cage numbers are unique
        if self.find_by_number(&data.cage_number).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Cage '{}' already exists",
                data.cage_number
            )));
        }

        let cage = Cage {
            id: None,
            cage_number: data.cage_number,
            cage_type: data.cage_type,
            capacity,
            daily_rate: data.daily_rate,
            status: data.status.unwrap_or(CageStatus::Available),
        };

        let created: Option<Cage> = self.base.db().create(TABLE).content(cage).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create cage".to_string()))
    }

    /// Update a cage
    pub async fn update(&self, id: &str, data: CageUpdate) -> RepoResult<Cage> {
        let thing = self.base.parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Cage {} not found", id)))?;

        if let Some(number) = &data.cage_number {
            if number.trim().is_empty() {
                return Err(RepoError::Validation("cage_number must not be empty".into()));
            }
            if let Some(found) = self.find_by_number(number).await?
                && found.id != existing.id
            {
                return Err(RepoError::Duplicate(format!(
                    "Cage '{}' already exists",
                    number
                )));
            }
        }
        if let Some(rate) = data.daily_rate
            && rate < 0.0
        {
            return Err(RepoError::Validation("daily_rate must be >= 0".into()));
        }
        if let Some(capacity) = data.capacity
            && capacity < 1
        {
            return Err(RepoError::Validation("capacity must be >= 1".into()));
        }

        let cage_number = data.cage_number.unwrap_or(existing.cage_number);
        let cage_type = data.cage_type.unwrap_or(existing.cage_type);
        let capacity = data.capacity.unwrap_or(existing.capacity);
        let daily_rate = data.daily_rate.unwrap_or(existing.daily_rate);
        let status = data.status.unwrap_or(existing.status);

        self.base
            .db()
            .query("UPDATE $thing SET cage_number = $number, cage_type = $cage_type, capacity = $capacity, daily_rate = $daily_rate, status = $status")
            .bind(("thing", thing))
            .bind(("number", cage_number))
            .bind(("cage_type", cage_type.as_str()))
            .bind(("capacity", capacity))
            .bind(("daily_rate", daily_rate))
            .bind(("status", status.as_str()))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Cage {} not found", id)))
    }

    /// Hard delete a cage.
    ///
    /// Fails with a conflict while any active reservation still references
    /// the cage — deleting would orphan the reservation.
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = self.base.parse_id(id)?;
        if self.find_by_id(id).await?.is_none() {
            return Err(RepoError::NotFound(format!("Cage {} not found", id)));
        }

        let mut result = self
            .base
            .db()
            .query("SELECT * FROM reservation WHERE booking.kind = 'BOARDING' AND booking.cage = $cage AND status IN $active LIMIT 1")
            .bind(("cage", thing.to_string()))
            .bind(("active", ReservationStatus::active_set()))
            .await?;
        let in_use: Vec<serde_json::Value> = result.take(0)?;
        if !in_use.is_empty() {
            return Err(RepoError::Conflict(format!(
                "Cage {} has active reservations",
                id
            )));
        }

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
