//! Input Validation
//!
//! Field rules, timestamp parsing and a structured error collector for
//! measurement and sensor input.

mod collector;
mod datetime;
mod error;
mod validator;

pub use collector::{FieldError, FieldErrors};
pub use datetime::{parse_bound, parse_timestamp, Bound, TIMESTAMP_FORMAT};
pub use error::ValidationError;
pub use validator::{ValidationConfig, Validator};
