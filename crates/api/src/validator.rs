//! Request validators
//!
//! Violations are collected into a [`FieldErrors`]; the caller decides
//! whether to reject the request. Only store faults are returned as errors.

use std::sync::Arc;

use data_validator::{parse_timestamp, FieldErrors, ValidationError, Validator};

use crate::dto::{MeasurementDto, SensorDto};
use crate::error::ServiceError;
use crate::service::SensorService;

pub struct MeasurementValidator {
    rules: Validator,
    sensors: Arc<SensorService>,
}

impl MeasurementValidator {
    pub fn new(rules: Validator, sensors: Arc<SensorService>) -> Self {
        Self { rules, sensors }
    }

    pub async fn validate(
        &self,
        dto: &MeasurementDto,
        errors: &mut FieldErrors,
    ) -> Result<(), ServiceError> {
        if let Some(value) = self.rules.require("value", dto.value, errors) {
            self.rules.check_value("value", value, errors);
        }

        if let Some(sensor_id) = self.rules.require("sensorId", dto.sensor_id, errors) {
            if self.sensors.get_by_id(sensor_id).await?.is_none() {
                errors.reject(
                    "sensorId",
                    ValidationError::UnknownReference("Sensor with this id does not exist".into()),
                );
            }
        }

        if let Some(raw) = dto.timestamp.as_deref() {
            if let Err(e) = parse_timestamp(raw) {
                errors.reject("timestamp", e);
            }
        }

        Ok(())
    }
}

pub struct SensorValidator {
    rules: Validator,
    sensors: Arc<SensorService>,
}

impl SensorValidator {
    pub fn new(rules: Validator, sensors: Arc<SensorService>) -> Self {
        Self { rules, sensors }
    }

    pub async fn validate(&self, dto: &SensorDto, errors: &mut FieldErrors) -> Result<(), ServiceError> {
        if let Some(name) = self.rules.require("name", dto.name.as_deref(), errors) {
            let before = errors.len();
            self.rules.check_name("name", name, errors);

            if errors.len() == before && self.sensors.get_by_name(name.trim()).await?.is_some() {
                errors.reject(
                    "name",
                    ValidationError::Duplicate("Sensor with this name already exists".into()),
                );
            }
        }

        if let Some(location) = self.rules.require("location", dto.location.as_deref(), errors) {
            self.rules.check_location("location", location, errors);
        }

        Ok(())
    }
}
