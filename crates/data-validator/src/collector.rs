//! Structured collection of field violations

use std::fmt;

use crate::error::ValidationError;

/// Violation attached to a named input field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub error: ValidationError,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.field, self.error)
    }
}

/// Accumulates violations so callers can report all of them at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation for `field`
    pub fn reject(&mut self, field: impl Into<String>, error: ValidationError) {
        self.errors.push(FieldError {
            field: field.into(),
            error,
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// All violations as `field - message;` segments
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{e};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
