//! Weather Station API Server
//!
//! REST API for weather sensor measurements: creation, lookup by sensor or
//! location, and date-range filtering.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use anyhow::Context;
use data_validator::{ValidationConfig, Validator};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use storage::{MeasurementRepository, SensorRepository, SqliteRepository};
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
pub mod converter;
pub mod dto;
pub mod error;
pub mod extract;
pub mod rate_limit;
mod routes;
pub mod service;
pub mod telemetry;
pub mod validator;

use config::AppConfig;
use error::ApiError;
use service::{MeasurementService, SensorService};
use validator::{MeasurementValidator, SensorValidator};

/// Application state shared across handlers
pub struct AppState {
    pub measurements: MeasurementService,
    pub sensors: Arc<SensorService>,
    pub measurement_validator: MeasurementValidator,
    pub sensor_validator: SensorValidator,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Prometheus handle when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire services and validators over the given repositories
    pub fn new(
        measurements: Arc<dyn MeasurementRepository>,
        sensors: Arc<dyn SensorRepository>,
        validation: ValidationConfig,
    ) -> Self {
        let rules = Validator::new(validation);
        let sensor_service = Arc::new(SensorService::new(sensors, measurements.clone()));

        Self {
            measurements: MeasurementService::new(measurements),
            measurement_validator: MeasurementValidator::new(rules.clone(), sensor_service.clone()),
            sensor_validator: SensorValidator::new(rules, sensor_service.clone()),
            sensors: sensor_service,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub metrics: StoreMetrics,
}

/// Row counts
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMetrics {
    pub sensor_count: i64,
    pub measurement_count: i64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(routes::measurements::router())
        .merge(routes::sensors::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    let metrics = StoreMetrics {
        sensor_count: state.sensors.count().await?,
        measurement_count: state.measurements.count().await?,
    };

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        metrics,
    }))
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let repository = Arc::new(
        SqliteRepository::connect(&config.database.url, config.database.max_connections).await?,
    );

    let mut state = AppState::new(repository.clone(), repository, config.validation.clone());
    if config.metrics.enabled {
        state = state.with_metrics(telemetry::install_metrics()?);
    }

    let mut app = create_router(Arc::new(state));
    if config.rate_limit.enabled {
        let governor = rate_limit::create_governor_config(&config.rate_limit)
            .context("Invalid rate limit settings")?;
        app = app.layer(GovernorLayer { config: governor });
    }

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
