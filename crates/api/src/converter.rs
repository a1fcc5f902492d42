//! Mapping between wire DTOs and storage entities

use chrono::NaiveDateTime;
use data_validator::{parse_timestamp, TIMESTAMP_FORMAT};
use storage::{Measurement, NewMeasurement, NewSensor, Sensor};

use crate::dto::{
    MeasurementDto, MeasurementResponse, MeasurementResponseByLocation,
    MeasurementResponseBySensor, SensorDto, SensorResponse,
};

/// Build the write model; `None` if a required field is absent or the
/// timestamp cannot be read. An absent timestamp falls back to `now`.
pub fn to_new_measurement(dto: &MeasurementDto, now: NaiveDateTime) -> Option<NewMeasurement> {
    let timestamp = match dto.timestamp.as_deref() {
        Some(raw) => parse_timestamp(raw).ok()?,
        None => now,
    };

    Some(NewMeasurement {
        id: None,
        timestamp,
        value: dto.value?,
        sensor_id: dto.sensor_id?,
    })
}

pub fn to_new_sensor(dto: &SensorDto) -> Option<NewSensor> {
    Some(NewSensor {
        name: dto.name.as_deref()?.trim().to_string(),
        location: dto.location.as_deref()?.trim().to_string(),
    })
}

pub fn to_response_by_sensor(measurement: &Measurement) -> MeasurementResponseBySensor {
    MeasurementResponseBySensor {
        id: measurement.id,
        value: measurement.value,
        timestamp: format_timestamp(&measurement.timestamp),
        location: measurement.location().map(str::to_string),
    }
}

pub fn to_response_by_location(measurement: &Measurement) -> MeasurementResponseByLocation {
    MeasurementResponseByLocation {
        id: measurement.id,
        value: measurement.value,
        timestamp: format_timestamp(&measurement.timestamp),
        sensor_id: measurement.sensor.as_ref().map(|s| s.id),
        sensor_name: measurement.sensor.as_ref().map(|s| s.name.clone()),
    }
}

pub fn to_response(measurement: &Measurement) -> MeasurementResponse {
    MeasurementResponse {
        id: measurement.id,
        value: measurement.value,
        timestamp: format_timestamp(&measurement.timestamp),
        sensor: measurement.sensor.as_ref().map(to_sensor_response),
    }
}

pub fn to_sensor_response(sensor: &Sensor) -> SensorResponse {
    SensorResponse {
        id: sensor.id,
        name: sensor.name.clone(),
        location: sensor.location.clone(),
    }
}

fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}
