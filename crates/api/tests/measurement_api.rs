//! Router-level tests driving the full request pipeline over an in-memory store

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use data_validator::ValidationConfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use storage::SqliteRepository;
use tower::ServiceExt as _;
use weather_api::{create_router, AppState};

async fn app() -> Router {
    let repo = Arc::new(SqliteRepository::in_memory().await.unwrap());
    let state = AppState::new(repo.clone(), repo, ValidationConfig::default());
    create_router(Arc::new(state))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let (status, bytes) = send_request(app, request).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

/// Send a raw body with an optional content type, decoding the JSON reply
async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let (status, bytes) = send_request(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn add_sensor(app: &Router, name: &str, location: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/sensor/add",
        Some(json!({ "name": name, "location": location })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_i64().unwrap()
}

async fn add_measurement(app: &Router, value: f64, sensor_id: i64, timestamp: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/measurement/add",
        Some(json!({ "value": value, "sensorId": sensor_id, "timestamp": timestamp })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_add_then_get_by_id() {
    let app = app().await;
    let sensor_id = add_sensor(&app, "roof", "Minsk").await;

    let (status, body) = send(
        &app,
        "POST",
        "/measurement/add",
        Some(json!({ "value": 21.5, "sensorId": sensor_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/measurement/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], 21.5);
    assert_eq!(body["sensor"]["id"], sensor_id);
}

#[tokio::test]
async fn test_invalid_measurement_is_rejected_without_write() {
    let app = app().await;
    add_sensor(&app, "roof", "Minsk").await;

    let (status, body) = send(
        &app,
        "POST",
        "/measurement/add",
        Some(json!({ "sensorId": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("value - must not be empty"));
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);

    let (_, all) = send(&app, "GET", "/measurement/all", None).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_out_of_range_value() {
    let app = app().await;
    let sensor_id = add_sensor(&app, "roof", "Minsk").await;

    let (status, body) = send(
        &app,
        "POST",
        "/measurement/add",
        Some(json!({ "value": 150.0, "sensorId": sensor_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "value");
}

#[tokio::test]
async fn test_data_for_sensor() {
    let app = app().await;
    let roof = add_sensor(&app, "roof", "Minsk").await;
    let yard = add_sensor(&app, "yard", "Minsk").await;
    add_measurement(&app, 1.0, roof, "2024-03-01 10:00:00").await;
    add_measurement(&app, 2.0, yard, "2024-03-01 10:00:00").await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/measurement/getDataForSensorsName?sensorId={roof}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["location"], "Minsk");

    let (status, body) = send(
        &app,
        "GET",
        "/measurement/getDataForSensorsName?sensorId=999",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Sensor not found");
}

#[tokio::test]
async fn test_data_for_location_is_exact() {
    let app = app().await;
    let city = add_sensor(&app, "roof", "Minsk").await;
    let region = add_sensor(&app, "field", "Minsk region").await;
    add_measurement(&app, 1.0, city, "2024-03-01 10:00:00").await;
    add_measurement(&app, 2.0, region, "2024-03-01 10:00:00").await;

    let (status, body) = send(
        &app,
        "GET",
        "/measurement/getDataForLocation?location=Minsk",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["sensorName"], "roof");
}

#[tokio::test]
async fn test_data_for_location_and_date_includes_bounds() {
    let app = app().await;
    let sensor_id = add_sensor(&app, "roof", "Minsk").await;
    add_measurement(&app, 1.0, sensor_id, "2024-03-01 00:00:00").await;
    add_measurement(&app, 2.0, sensor_id, "2024-03-02 12:00:00").await;
    add_measurement(&app, 3.0, sensor_id, "2024-03-03 00:00:00").await;
    add_measurement(&app, 4.0, sensor_id, "2024-03-04 00:00:00").await;

    let (status, body) = send(
        &app,
        "GET",
        "/measurement/getDataForLocationAndDate?location=Minsk&from=2024-03-01%2000:00:00&to=2024-03-03%2000:00:00",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let values: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["value"].as_f64().unwrap())
        .collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);

    let (status, body) = send(
        &app,
        "GET",
        "/measurement/getDataForLocationAndDate?location=Minsk&from=2024-03-02&to=2024-03-02",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "GET",
        "/measurement/getDataForLocationAndDate?location=Minsk&from=yesterday&to=2024-03-02",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_delete_and_sensor_lookup() {
    let app = app().await;
    let sensor_id = add_sensor(&app, "roof", "Minsk").await;
    let id = add_measurement(&app, 1.0, sensor_id, "2024-03-01 00:00:00").await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/measurement/{id}"),
        Some(json!({ "value": 5.0, "sensorId": sensor_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", &format!("/measurement/{id}"), None).await;
    assert_eq!(body["id"], id);
    assert_eq!(body["value"], 5.0);

    let (status, body) = send(&app, "GET", &format!("/measurement/{id}/sensor"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "roof");

    let (status, _) = send(&app, "GET", "/measurement/999/sensor", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/measurement/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/measurement/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_sorted_by_date() {
    let app = app().await;
    let sensor_id = add_sensor(&app, "roof", "Minsk").await;
    add_measurement(&app, 3.0, sensor_id, "2024-03-03 00:00:00").await;
    add_measurement(&app, 1.0, sensor_id, "2024-03-01 00:00:00").await;
    add_measurement(&app, 2.0, sensor_id, "2024-03-02 00:00:00").await;

    let (status, body) = send(
        &app,
        "GET",
        "/measurement/page?page=0&perPage=2&sortByDate=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let values: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["value"].as_f64().unwrap())
        .collect();
    assert_eq!(values, vec![1.0, 2.0]);

    let (status, _) = send(&app, "GET", "/measurement/page?perPage=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_sensor_and_health() {
    let app = app().await;
    let id = add_sensor(&app, "roof", "Minsk").await;

    let (status, body) = send(
        &app,
        "POST",
        "/sensor/add",
        Some(json!({ "name": "roof", "location": "Brest" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "name");

    let (status, body) = send(&app, "GET", &format!("/sensor/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "Minsk");

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"]["sensorCount"], 1);
    assert_eq!(body["metrics"]["measurementCount"], 0);
    assert!(body["uptimeSeconds"].is_u64());

    let (status, _) = send(&app, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body_is_json_bad_request() {
    let app = app().await;
    let sensor_id = add_sensor(&app, "roof", "Minsk").await;

    let (status, body) = send(
        &app,
        "POST",
        "/measurement/add",
        Some(json!({ "value": "abc", "sensorId": sensor_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Malformed request"));

    let payload = json!({ "value": 1.0, "sensorId": sensor_id }).to_string();
    let (status, body) = send_raw(&app, "POST", "/measurement/add", None, &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = send_raw(
        &app,
        "PUT",
        "/measurement/1",
        Some("application/json"),
        "{not json",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = send_raw(
        &app,
        "POST",
        "/sensor/add",
        Some("application/json"),
        r#"{"name": 7, "location": "Minsk"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (_, all) = send(&app, "GET", "/measurement/all", None).await;
    assert_eq!(all.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_malformed_query_and_path_are_json_bad_request() {
    let app = app().await;

    for uri in [
        "/measurement/getDataForLocationAndDate?location=Minsk&from=2024-03-01",
        "/measurement/getDataForSensorsName?sensorId=abc",
        "/measurement/getDataForLocation",
        "/measurement/page?perPage=-1",
        "/measurement/abc",
        "/sensor/abc",
    ] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(
            body["message"].as_str().unwrap().starts_with("Malformed request"),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn test_metrics_rendered_when_enabled() {
    let repo = Arc::new(SqliteRepository::in_memory().await.unwrap());
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let state = AppState::new(repo.clone(), repo, ValidationConfig::default()).with_metrics(handle);
    let app = create_router(Arc::new(state));

    let request = Request::builder()
        .method("GET")
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_request(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).is_ok());
}
