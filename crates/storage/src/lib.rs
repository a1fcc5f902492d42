//! Storage Layer
//!
//! Sensor and measurement persistence behind repository traits, with a
//! SQLite implementation backed by sqlx.

mod models;
mod repository;
mod sqlite;

pub use models::{Measurement, NewMeasurement, NewSensor, PageRequest, Sensor};
pub use repository::{MeasurementRepository, SensorRepository};
pub use sqlite::SqliteRepository;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Invalid connection string: {0}")]
    InvalidUrl(String),
}
