//! Rubber farm and planting detail records.

use serde::{Deserialize, Serialize};

/// A registered rubber farm. Versioned independently of its planting
/// details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubberFarm {
    pub id: i64,
    pub owner_user_id: i64,
    pub village_name: String,
    pub moo: Option<String>,
    pub road: Option<String>,
    pub alley: Option<String>,
    pub subdistrict: String,
    pub district: String,
    pub province: String,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Caller-supplied farm fields, as they arrive in create/update
/// payloads (no id/version — those are server-assigned).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmData {
    pub village_name: String,
    pub moo: Option<String>,
    pub road: Option<String>,
    pub alley: Option<String>,
    pub subdistrict: String,
    pub district: String,
    pub province: String,
}

/// One planted plot of a farm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantingDetail {
    pub id: i64,
    pub rubber_farm_id: i64,
    pub specie: String,
    /// Plot area in rai.
    pub area_of_plot: f64,
    pub number_of_rubber: i64,
    pub number_of_tapping: i64,
    pub age_of_rubber: i64,
    pub year_of_tapping: Option<i64>,
    pub month_of_tapping: Option<i64>,
    /// kg per year, once tapping has started.
    pub total_production: Option<f64>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Caller-supplied planting-detail fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantingData {
    pub specie: String,
    pub area_of_plot: f64,
    pub number_of_rubber: i64,
    pub number_of_tapping: i64,
    pub age_of_rubber: i64,
    pub year_of_tapping: Option<i64>,
    pub month_of_tapping: Option<i64>,
    pub total_production: Option<f64>,
}
