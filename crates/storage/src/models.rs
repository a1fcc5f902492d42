//! Persisted entities and write models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Weather sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sensor {
    pub id: i64,
    pub name: String,
    pub location: String,
}

/// Sensor to be registered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSensor {
    pub name: String,
    pub location: String,
}

/// Stored measurement joined with its sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub value: f64,
    /// Referenced sensor; the measurement does not own it
    pub sensor: Option<Sensor>,
}

impl Measurement {
    /// Location of the referenced sensor, if loaded
    pub fn location(&self) -> Option<&str> {
        self.sensor.as_ref().map(|s| s.location.as_str())
    }
}

/// Measurement write model.
///
/// `id: None` inserts a new row with a generated id; `Some(id)` replaces the
/// row at `id` or creates it when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeasurement {
    pub id: Option<i64>,
    pub timestamp: NaiveDateTime,
    pub value: f64,
    pub sensor_id: i64,
}

/// Page selection for measurement listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index
    pub page: u32,
    /// Rows per page, must be positive
    pub per_page: u32,
    /// Order by timestamp instead of id
    pub sort_by_date: bool,
}

impl PageRequest {
    /// Row offset of the first record on this page
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}
