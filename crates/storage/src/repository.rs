//! Repository Traits

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::models::{Measurement, NewMeasurement, NewSensor, PageRequest, Sensor};
use crate::StorageError;

/// Measurement persistence
#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Find a measurement by id
    async fn find_by_id(&self, id: i64) -> Result<Option<Measurement>, StorageError>;

    /// All measurements ordered by id
    async fn find_all(&self) -> Result<Vec<Measurement>, StorageError>;

    /// Insert or replace a measurement, returning its id
    async fn save(&self, measurement: NewMeasurement) -> Result<i64, StorageError>;

    /// Delete by id; `false` when no row matched
    async fn delete_by_id(&self, id: i64) -> Result<bool, StorageError>;

    /// Measurements taken by one sensor
    async fn find_by_sensor(&self, sensor_id: i64) -> Result<Vec<Measurement>, StorageError>;

    /// Measurements whose sensor location equals `location` exactly
    async fn find_by_location(&self, location: &str) -> Result<Vec<Measurement>, StorageError>;

    /// Measurements at `location` with `from <= timestamp <= to`
    async fn find_by_location_between(
        &self,
        location: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Measurement>, StorageError>;

    /// One page of measurements
    async fn find_page(&self, page: PageRequest) -> Result<Vec<Measurement>, StorageError>;

    /// Total number of measurements
    async fn count(&self) -> Result<i64, StorageError>;
}

/// Sensor persistence
#[async_trait]
pub trait SensorRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Sensor>, StorageError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Sensor>, StorageError>;

    /// Insert a sensor, returning its generated id
    async fn save(&self, sensor: NewSensor) -> Result<i64, StorageError>;

    async fn count(&self) -> Result<i64, StorageError>;
}
