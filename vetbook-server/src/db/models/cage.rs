//! Boarding Cage Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Cage size class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CageType {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl CageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CageType::Small => "SMALL",
            CageType::Medium => "MEDIUM",
            CageType::Large => "LARGE",
            CageType::ExtraLarge => "EXTRA_LARGE",
        }
    }
}

/// Administrative cage status set by staff.
///
/// 与预约档期推导出的可用性是两个独立信号，互不覆盖。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CageStatus {
    Available,
    Occupied,
    Maintenance,
    Reserved,
}

impl CageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CageStatus::Available => "AVAILABLE",
            CageStatus::Occupied => "OCCUPIED",
            CageStatus::Maintenance => "MAINTENANCE",
            CageStatus::Reserved => "RESERVED",
        }
    }
}

/// Boarding cage entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cage {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Unique cage number, e.g. "C-01"
    pub cage_number: String,
    pub cage_type: CageType,
    /// How many pets fit at once (>= 1)
    pub capacity: i32,
    /// Daily boarding rate (>= 0)
    pub daily_rate: f64,
    pub status: CageStatus,
}

/// Create cage payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CageCreate {
    pub cage_number: String,
    pub cage_type: CageType,
    pub capacity: Option<i32>,
    pub daily_rate: f64,
    pub status: Option<CageStatus>,
}

/// Update cage payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cage_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cage_type: Option<CageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CageStatus>,
}
