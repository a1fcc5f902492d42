//! Service and HTTP error types

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::FieldErrors;
use serde::{Deserialize, Serialize};
use storage::StorageError;
use thiserror::Error;
use tracing::error;

/// Errors raised by the service layer
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Measurement with id {0} not found")]
    MeasurementNotFound(i64),

    #[error("Sensor with id {0} not found")]
    SensorNotFound(i64),

    #[error("Invalid page request: {0}")]
    InvalidPage(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors surfaced at the HTTP boundary
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Measurement not created: {0}")]
    MeasurementNotCreated(FieldErrors),

    #[error("Sensor not created: {0}")]
    SensorNotCreated(FieldErrors),

    #[error("{0}")]
    InvalidQuery(String),

    /// Body, query string or path that could not be read into the request type
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Measurement with id {0} not found")]
    MeasurementNotFound(i64),

    #[error("Sensor not found")]
    SensorNotFound,

    /// Store faults; the detail is logged, never returned
    #[error("Internal server error")]
    Internal(#[source] StorageError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MeasurementNotCreated(_)
            | ApiError::SensorNotCreated(_)
            | ApiError::InvalidQuery(_)
            | ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MeasurementNotFound(_) | ApiError::SensorNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn field_errors(&self) -> Vec<FieldErrorBody> {
        match self {
            ApiError::MeasurementNotCreated(errors) | ApiError::SensorNotCreated(errors) => errors
                .iter()
                .map(|e| FieldErrorBody {
                    field: e.field.clone(),
                    message: e.error.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::MeasurementNotFound(id) => ApiError::MeasurementNotFound(id),
            ServiceError::SensorNotFound(_) => ApiError::SensorNotFound,
            ServiceError::InvalidPage(reason) => ApiError::InvalidQuery(reason),
            ServiceError::Storage(e) => ApiError::Internal(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrorBody>,
}

/// One field violation in an error response
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldErrorBody {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Internal(source) = &self {
            error!("Storage failure: {}", source);
        }

        let body = ErrorResponse {
            message: self.to_string(),
            errors: self.field_errors(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_validator::ValidationError;

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            ApiError::from(ServiceError::MeasurementNotFound(7)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ServiceError::SensorNotFound(7)).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_validation_failure_lists_fields() {
        let mut errors = FieldErrors::new();
        errors.reject("value", ValidationError::MissingField);
        let err = ApiError::MeasurementNotCreated(errors);

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Measurement not created: value - must not be empty;");

        let fields = err.field_errors();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "value");
    }

    #[test]
    fn test_malformed_request_is_bad_request() {
        let err = ApiError::MalformedRequest("missing field `to`".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Malformed request: missing field `to`");
        assert!(err.field_errors().is_empty());
    }

    #[test]
    fn test_invalid_page_is_bad_request() {
        let err = ApiError::from(ServiceError::InvalidPage("perPage must be positive".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
