//! Validation Error Types

use thiserror::Error;

/// A single field-level violation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("value {value} is out of range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    /// Text length outside allowed bounds
    #[error("length must be between {min} and {max} characters")]
    InvalidLength { min: usize, max: usize },

    /// Invalid data format
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Missing required field
    #[error("must not be empty")]
    MissingField,

    /// Reference to a record that does not exist
    #[error("{0}")]
    UnknownReference(String),

    /// Value already taken by another record
    #[error("{0}")]
    Duplicate(String),
}
