//! Sensor Routes

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use data_validator::FieldErrors;
use std::sync::Arc;
use tracing::warn;

use crate::converter;
use crate::dto::{CreatedResponse, SensorDto, SensorResponse};
use crate::error::ApiError;
use crate::extract::{AppJson, AppPath};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sensor/add", post(add_sensor))
        .route("/sensor/:id", get(get_sensor))
}

/// Register a sensor
pub async fn add_sensor(
    State(state): State<Arc<AppState>>,
    AppJson(dto): AppJson<SensorDto>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let mut errors = FieldErrors::new();
    state.sensor_validator.validate(&dto, &mut errors).await?;
    if errors.has_errors() {
        warn!("Rejected sensor: {}", errors);
        return Err(ApiError::SensorNotCreated(errors));
    }

    let sensor =
        converter::to_new_sensor(&dto).ok_or_else(|| ApiError::SensorNotCreated(errors))?;
    let id = state.sensors.register(sensor).await?;

    Ok(Json(CreatedResponse { id }))
}

/// Get a sensor by id
pub async fn get_sensor(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<SensorResponse>, ApiError> {
    let sensor = state
        .sensors
        .get_by_id(id)
        .await?
        .ok_or(ApiError::SensorNotFound)?;

    Ok(Json(converter::to_sensor_response(&sensor)))
}
