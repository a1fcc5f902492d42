//! Field rules for measurement and sensor input

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::collector::FieldErrors;
use crate::error::ValidationError;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Accepted measurement value range (inclusive)
    pub value_range: (f64, f64),
    /// Sensor name length bounds in characters
    pub name_length: (usize, usize),
    /// Sensor location length bounds in characters
    pub location_length: (usize, usize),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            value_range: (-100.0, 100.0),
            name_length: (3, 30),
            location_length: (1, 100),
        }
    }
}

/// Rule checker that reports into a [`FieldErrors`] collector
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against a range
    pub fn validate_range(&self, value: f64, range: (f64, f64)) -> Result<(), ValidationError> {
        // NaN fails both comparisons
        if value >= range.0 && value <= range.1 {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                value,
                min: range.0,
                max: range.1,
            })
        }
    }

    /// Validate text length in characters
    pub fn validate_length(&self, text: &str, bounds: (usize, usize)) -> Result<(), ValidationError> {
        let len = text.chars().count();
        if len < bounds.0 || len > bounds.1 {
            Err(ValidationError::InvalidLength {
                min: bounds.0,
                max: bounds.1,
            })
        } else {
            Ok(())
        }
    }

    /// Record a missing-field violation when `value` is absent
    pub fn require<T>(&self, field: &str, value: Option<T>, errors: &mut FieldErrors) -> Option<T> {
        if value.is_none() {
            trace!(field, "required field missing");
            errors.reject(field, ValidationError::MissingField);
        }
        value
    }

    /// Check a measurement reading against the configured range
    pub fn check_value(&self, field: &str, value: f64, errors: &mut FieldErrors) {
        if let Err(e) = self.validate_range(value, self.config.value_range) {
            errors.reject(field, e);
        }
    }

    /// Check a sensor name; blank counts as missing
    pub fn check_name(&self, field: &str, name: &str, errors: &mut FieldErrors) {
        self.check_text(field, name, self.config.name_length, errors);
    }

    /// Check a sensor location; blank counts as missing
    pub fn check_location(&self, field: &str, location: &str, errors: &mut FieldErrors) {
        self.check_text(field, location, self.config.location_length, errors);
    }

    fn check_text(&self, field: &str, text: &str, bounds: (usize, usize), errors: &mut FieldErrors) {
        if text.trim().is_empty() {
            errors.reject(field, ValidationError::MissingField);
        } else if let Err(e) = self.validate_length(text, bounds) {
            errors.reject(field, e);
        }
    }
}
