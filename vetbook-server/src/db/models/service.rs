//! Clinic Service Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Service category: boarding stays vs single-visit services
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceCategory {
    Regular,
    Boarding,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Regular => "REGULAR",
            ServiceCategory::Boarding => "BOARDING",
        }
    }
}

/// Clinic service entity (consultation, grooming, boarding, ...)
///
/// Regular services carry a fixed duration; boarding services have no
/// duration and imply a check-in/check-out date range instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    /// Base price per pet (>= 0)
    pub price: f64,
    /// Required for REGULAR, absent for BOARDING
    pub duration_minutes: Option<i32>,
    pub category: ServiceCategory,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Create service payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCreate {
    pub name: String,
    pub price: f64,
    pub duration_minutes: Option<i32>,
    pub category: ServiceCategory,
}

/// Update service payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ServiceCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
