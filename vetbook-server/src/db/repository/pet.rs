//! Pet Repository
//!
//! Read-mostly: pets are managed by the external client directory.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Pet, PetCreate, SizeClass};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "pet";

#[derive(Clone)]
pub struct PetRepository {
    base: BaseRepository,
}

impl PetRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Pet>> {
        let pets: Vec<Pet> = self
            .base
            .db()
            .query("SELECT * FROM pet ORDER BY name")
            .await?
            .take(0)?;
        Ok(pets)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Pet>> {
        let thing = self.base.parse_id(id)?;
        let pet: Option<Pet> = self.base.db().select(thing).await?;
        Ok(pet)
    }

    /// Resolve a batch of pet ids, failing on the first unknown one
    pub async fn find_by_ids(&self, ids: &[String]) -> RepoResult<Vec<Pet>> {
        let mut pets = Vec::with_capacity(ids.len());
        for id in ids {
            let pet = self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Pet {} not found", id)))?;
            pets.push(pet);
        }
        Ok(pets)
    }

    /// Create a pet (admin seeding)
    pub async fn create(&self, data: PetCreate) -> RepoResult<Pet> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("name must not be empty".into()));
        }
        let size = SizeClass::classify(&data.species, &data.breed);
        let pet = Pet {
            id: None,
            client_id: data.client_id,
            name: data.name,
            species: data.species,
            breed: data.breed,
            size,
        };
        let created: Option<Pet> = self.base.db().create(TABLE).content(pet).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create pet".to_string()))
    }
}
