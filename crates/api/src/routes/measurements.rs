//! Measurement Routes

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use data_validator::{parse_bound, Bound, FieldErrors};
use metrics::counter;
use std::sync::Arc;
use storage::NewMeasurement;
use tracing::{debug, warn};

use crate::converter;
use crate::dto::{
    CreatedResponse, LocationDateQuery, LocationQuery, MeasurementDto, MeasurementResponse,
    MeasurementResponseByLocation, MeasurementResponseBySensor, PageQuery, SensorQuery,
    SensorResponse,
};
use crate::error::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/measurement/add", post(add_measurement))
        .route("/measurement/getDataForSensorsName", get(get_by_sensor))
        .route("/measurement/getDataForLocation", get(get_by_location))
        .route("/measurement/getDataForLocationAndDate", get(get_by_location_and_date))
        .route("/measurement/all", get(get_all))
        .route("/measurement/page", get(get_page))
        .route(
            "/measurement/:id",
            get(get_measurement)
                .put(update_measurement)
                .delete(delete_measurement),
        )
        .route("/measurement/:id/sensor", get(get_measurement_sensor))
}

/// Run the validator and convert, or reject with every violation
async fn validated(state: &AppState, dto: &MeasurementDto) -> Result<NewMeasurement, ApiError> {
    let mut errors = FieldErrors::new();
    state.measurement_validator.validate(dto, &mut errors).await?;

    if errors.has_errors() {
        warn!("Rejected measurement: {}", errors);
        counter!("measurements_rejected_total").increment(1);
        return Err(ApiError::MeasurementNotCreated(errors));
    }

    converter::to_new_measurement(dto, Utc::now().naive_utc())
        .ok_or_else(|| ApiError::MeasurementNotCreated(errors))
}

/// Create a measurement
pub async fn add_measurement(
    State(state): State<Arc<AppState>>,
    AppJson(dto): AppJson<MeasurementDto>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let measurement = validated(&state, &dto).await?;
    let id = state.measurements.save(measurement).await?;

    Ok(Json(CreatedResponse { id }))
}

/// Measurements of one sensor
pub async fn get_by_sensor(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<SensorQuery>,
) -> Result<Json<Vec<MeasurementResponseBySensor>>, ApiError> {
    let data = state.sensors.get_measurements(params.sensor_id).await?;
    debug!("Sensor {} has {} measurements", params.sensor_id, data.len());

    Ok(Json(data.iter().map(converter::to_response_by_sensor).collect()))
}

/// Measurements at an exact location
pub async fn get_by_location(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<LocationQuery>,
) -> Result<Json<Vec<MeasurementResponseByLocation>>, ApiError> {
    let data = state.measurements.get_by_location(&params.location).await?;

    Ok(Json(data.iter().map(converter::to_response_by_location).collect()))
}

/// Measurements at a location within an inclusive date range
pub async fn get_by_location_and_date(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<LocationDateQuery>,
) -> Result<Json<Vec<MeasurementResponseByLocation>>, ApiError> {
    let from = parse_bound(&params.from, Bound::Start)
        .map_err(|e| ApiError::InvalidQuery(format!("from - {e}")))?;
    let to = parse_bound(&params.to, Bound::End)
        .map_err(|e| ApiError::InvalidQuery(format!("to - {e}")))?;

    let data = state
        .measurements
        .get_by_location_between(&params.location, from, to)
        .await?;

    Ok(Json(data.iter().map(converter::to_response_by_location).collect()))
}

pub async fn get_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MeasurementResponse>>, ApiError> {
    let data = state.measurements.get_all().await?;
    Ok(Json(data.iter().map(converter::to_response).collect()))
}

/// One page of measurements, optionally ordered by date
pub async fn get_page(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<PageQuery>,
) -> Result<Json<Vec<MeasurementResponse>>, ApiError> {
    let data = state
        .measurements
        .get_pageable_and_sorted(params.page, params.per_page, params.sort_by_date)
        .await?;

    Ok(Json(data.iter().map(converter::to_response).collect()))
}

pub async fn get_measurement(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<MeasurementResponse>, ApiError> {
    let measurement = state
        .measurements
        .get_by_id(id)
        .await?
        .ok_or(ApiError::MeasurementNotFound(id))?;

    Ok(Json(converter::to_response(&measurement)))
}

/// Replace (or create) the measurement at `id`
pub async fn update_measurement(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<MeasurementDto>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let measurement = validated(&state, &dto).await?;
    state.measurements.update(id, measurement).await?;

    Ok(Json(CreatedResponse { id }))
}

pub async fn delete_measurement(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.measurements.delete_by_id(id).await?;
    Ok(StatusCode::OK)
}

/// Sensor that took measurement `id`
pub async fn get_measurement_sensor(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<SensorResponse>, ApiError> {
    let sensor = state
        .measurements
        .get_sensor(id)
        .await?
        .ok_or(ApiError::SensorNotFound)?;

    Ok(Json(converter::to_sensor_response(&sensor)))
}
