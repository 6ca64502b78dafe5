//! Service Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{ReservationStatus, Service, ServiceCategory, ServiceCreate, ServiceUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "service";

#[derive(Clone)]
pub struct ServiceRepository {
    base: BaseRepository,
}

impl ServiceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find services, optionally filtered by category; inactive services
    /// are listed only when `include_inactive` is set
    pub async fn find_all(
        &self,
        category: Option<ServiceCategory>,
        include_inactive: bool,
    ) -> RepoResult<Vec<Service>> {
        let mut sql = String::from("SELECT * FROM service");
        let mut clauses: Vec<&str> = Vec::new();
        if category.is_some() {
            clauses.push("category = $category");
        }
        if !include_inactive {
            clauses.push("is_active = true");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY name");

        let mut query = self.base.db().query(sql);
        if let Some(c) = category {
            query = query.bind(("category", c.as_str()));
        }
        let services: Vec<Service> = query.await?.take(0)?;
        Ok(services)
    }

    /// Find service by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Service>> {
        let thing = self.base.parse_id(id)?;
        let service: Option<Service> = self.base.db().select(thing).await?;
        Ok(service)
    }

    /// Create a new service
    pub async fn create(&self, data: ServiceCreate) -> RepoResult<Service> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("name must not be empty".into()));
        }
        if data.price < 0.0 {
            return Err(RepoError::Validation("price must be >= 0".into()));
        }
        match data.category {
            ServiceCategory::Regular => {
                let minutes = data
                    .duration_minutes
                    .ok_or_else(|| RepoError::Validation("duration_minutes is required for regular services".into()))?;
                if minutes < 1 {
                    return Err(RepoError::Validation("duration_minutes must be >= 1".into()));
                }
            }
            ServiceCategory::Boarding => {
                if data.duration_minutes.is_some() {
                    return Err(RepoError::Validation(
                        "boarding services have no fixed duration".into(),
                    ));
                }
            }
        }

        let service = Service {
            id: None,
            name: data.name,
            price: data.price,
            duration_minutes: data.duration_minutes,
            category: data.category,
            is_active: true,
        };

        let created: Option<Service> = self.base.db().create(TABLE).content(service).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create service".to_string()))
    }

    /// Update a service
    pub async fn update(&self, id: &str, data: ServiceUpdate) -> RepoResult<Service> {
        let thing = self.base.parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Service {} not found", id)))?;

        if let Some(name) = &data.name
            && name.trim().is_empty()
        {
            return Err(RepoError::Validation("name must not be empty".into()));
        }
        if let Some(price) = data.price
            && price < 0.0
        {
            return Err(RepoError::Validation("price must be >= 0".into()));
        }

        let name = data.name.unwrap_or(existing.name);
        let price = data.price.unwrap_or(existing.price);
        let category = data.category.unwrap_or(existing.category);
        let duration_minutes = match category {
            ServiceCategory::Boarding => None,
            ServiceCategory::Regular => {
                let minutes = data.duration_minutes.or(existing.duration_minutes).ok_or_else(
                    || RepoError::Validation("duration_minutes is required for regular services".into()),
                )?;
                if minutes < 1 {
                    return Err(RepoError::Validation("duration_minutes must be >= 1".into()));
                }
                Some(minutes)
            }
        };
        let is_active = data.is_active.unwrap_or(existing.is_active);

        self.base
            .db()
            .query("UPDATE $thing SET name = $name, price = $price, duration_minutes = $duration, category = $category, is_active = $is_active")
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("price", price))
            .bind(("duration", duration_minutes))
            .bind(("category", category.as_str()))
            .bind(("is_active", is_active))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Service {} not found", id)))
    }

    /// Hard delete a service, refused while active reservations reference it
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = self.base.parse_id(id)?;
        if self.find_by_id(id).await?.is_none() {
            return Err(RepoError::NotFound(format!("Service {} not found", id)));
        }

        let mut result = self
            .base
            .db()
            .query("SELECT * FROM reservation WHERE service = $service AND status IN $active LIMIT 1")
            .bind(("service", thing.to_string()))
            .bind(("active", ReservationStatus::active_set()))
            .await?;
        let in_use: Vec<serde_json::Value> = result.take(0)?;
        if !in_use.is_empty() {
            return Err(RepoError::Conflict(format!(
                "Service {} has active reservations",
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
