//! Measurement and Sensor Services
//!
//! Thin façades over the repositories. Each write is one store transaction;
//! filtering and ordering happen in the store.

use std::sync::Arc;

use chrono::NaiveDateTime;
use metrics::counter;
use storage::{
    Measurement, MeasurementRepository, NewMeasurement, NewSensor, PageRequest, Sensor,
    SensorRepository,
};
use tracing::{debug, info};

use crate::error::ServiceError;

/// Upper bound on rows per page
pub const MAX_PER_PAGE: u32 = 500;

pub struct MeasurementService {
    repository: Arc<dyn MeasurementRepository>,
}

impl MeasurementService {
    pub fn new(repository: Arc<dyn MeasurementRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_all(&self) -> Result<Vec<Measurement>, ServiceError> {
        let measurements = self.repository.find_all().await?;
        debug!(count = measurements.len(), "Loaded all measurements");
        Ok(measurements)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Measurement>, ServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Store `measurement` at `id`, replacing any existing row.
    /// The id carried by `measurement` is ignored.
    pub async fn update(&self, id: i64, mut measurement: NewMeasurement) -> Result<(), ServiceError> {
        measurement.id = Some(id);
        self.repository.save(measurement).await?;
        info!("Updated measurement {}", id);
        Ok(())
    }

    /// Insert a new measurement and return its generated id
    pub async fn save(&self, mut measurement: NewMeasurement) -> Result<i64, ServiceError> {
        measurement.id = None;
        let id = self.repository.save(measurement).await?;
        counter!("measurements_saved_total").increment(1);
        info!("Saved measurement {}", id);
        Ok(id)
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<(), ServiceError> {
        if !self.repository.delete_by_id(id).await? {
            return Err(ServiceError::MeasurementNotFound(id));
        }
        info!("Deleted measurement {}", id);
        Ok(())
    }

    /// Sensor referenced by measurement `id`
    pub async fn get_sensor(&self, id: i64) -> Result<Option<Sensor>, ServiceError> {
        match self.repository.find_by_id(id).await? {
            Some(measurement) => Ok(measurement.sensor),
            None => Err(ServiceError::MeasurementNotFound(id)),
        }
    }

    pub async fn get_pageable_and_sorted(
        &self,
        page: u32,
        per_page: u32,
        sort_by_date: bool,
    ) -> Result<Vec<Measurement>, ServiceError> {
        if per_page == 0 {
            return Err(ServiceError::InvalidPage("perPage must be positive".to_string()));
        }

        let request = PageRequest {
            page,
            per_page: per_page.min(MAX_PER_PAGE),
            sort_by_date,
        };
        Ok(self.repository.find_page(request).await?)
    }

    pub async fn get_by_location(&self, location: &str) -> Result<Vec<Measurement>, ServiceError> {
        Ok(self.repository.find_by_location(location).await?)
    }

    /// Measurements at `location` taken within `[from, to]`
    pub async fn get_by_location_between(
        &self,
        location: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Measurement>, ServiceError> {
        Ok(self
            .repository
            .find_by_location_between(location, from, to)
            .await?)
    }

    pub async fn count(&self) -> Result<i64, ServiceError> {
        Ok(self.repository.count().await?)
    }
}

pub struct SensorService {
    repository: Arc<dyn SensorRepository>,
    measurements: Arc<dyn MeasurementRepository>,
}

impl SensorService {
    pub fn new(
        repository: Arc<dyn SensorRepository>,
        measurements: Arc<dyn MeasurementRepository>,
    ) -> Self {
        Self {
            repository,
            measurements,
        }
    }

    pub async fn register(&self, sensor: NewSensor) -> Result<i64, ServiceError> {
        let name = sensor.name.clone();
        let id = self.repository.save(sensor).await?;
        counter!("sensors_registered_total").increment(1);
        info!("Registered sensor {} as {}", name, id);
        Ok(id)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Sensor>, ServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Sensor>, ServiceError> {
        Ok(self.repository.find_by_name(name).await?)
    }

    /// Measurements taken by sensor `id`; fails if the sensor is unknown
    pub async fn get_measurements(&self, id: i64) -> Result<Vec<Measurement>, ServiceError> {
        if self.repository.find_by_id(id).await?.is_none() {
            return Err(ServiceError::SensorNotFound(id));
        }
        Ok(self.measurements.find_by_sensor(id).await?)
    }

    pub async fn count(&self) -> Result<i64, ServiceError> {
        Ok(self.repository.count().await?)
    }
}
