//! Pet Model
//!
//! Pets are owned by the client directory; the booking engine only reads
//! them to validate reservation requests. Immutable for booking purposes.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Non-binding sizing hint derived from species/breed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// Derive a sizing hint. Used only for cage suggestions, never for
    /// pricing or validation.
    pub fn classify(species: &str, breed: &str) -> Self {
        let species = species.to_lowercase();
        if species != "dog" {
            return SizeClass::Small;
        }
        let breed = breed.to_lowercase();
        const LARGE_BREEDS: [&str; 6] = [
            "labrador",
            "golden retriever",
            "german shepherd",
            "rottweiler",
            "husky",
            "great dane",
        ];
        const SMALL_BREEDS: [&str; 5] = ["chihuahua", "pomeranian", "shih tzu", "pug", "dachshund"];
        if LARGE_BREEDS.iter().any(|b| breed.contains(b)) {
            SizeClass::Large
        } else if SMALL_BREEDS.iter().any(|b| breed.contains(b)) {
            SizeClass::Small
        } else {
            SizeClass::Medium
        }
    }
}

/// Pet entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Owning client reference (opaque id from the client directory)
    pub client_id: String,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub size: SizeClass,
}

/// Create pet payload (admin seeding; client profile management is external)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetCreate {
    pub client_id: String,
    pub name: String,
    pub species: String,
    pub breed: String,
}
