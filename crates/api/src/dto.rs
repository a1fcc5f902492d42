//! Wire-format request and response bodies

use serde::{Deserialize, Serialize};

/// Measurement submitted by a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementDto {
    pub value: Option<f64>,
    pub sensor_id: Option<i64>,
    /// Taken at; defaults to the time of receipt
    pub timestamp: Option<String>,
}

/// Sensor submitted by a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorDto {
    pub name: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Measurement listed for a single sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResponseBySensor {
    pub id: i64,
    pub value: f64,
    pub timestamp: String,
    pub location: Option<String>,
}

/// Measurement listed for a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResponseByLocation {
    pub id: i64,
    pub value: f64,
    pub timestamp: String,
    pub sensor_id: Option<i64>,
    pub sensor_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResponse {
    pub id: i64,
    pub value: f64,
    pub timestamp: String,
    pub sensor: Option<SensorResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorResponse {
    pub id: i64,
    pub name: String,
    pub location: String,
}

/// Query parameters for the by-sensor listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorQuery {
    pub sensor_id: i64,
}

/// Query parameters for the by-location listing
#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location: String,
}

/// Query parameters for the by-location-and-date listing
#[derive(Debug, Deserialize)]
pub struct LocationDateQuery {
    pub location: String,
    pub from: String,
    pub to: String,
}

/// Query parameters for the paged listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub sort_by_date: bool,
}

fn default_per_page() -> u32 {
    20
}
