//! Field validation rules, applied on every create and update.

use serde_json::{Map, Value};
use thiserror::Error;

pub const FOUNDING_YEAR_MIN: i64 = 1600;
pub const FOUNDING_YEAR_MAX: i64 = 2023;

/// A single field failure. Messages are the API contract: they appear
/// verbatim in `{"errors": [...]}` bodies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// A publisher's founding year must lie in [1600, 2023].
pub fn validate_founding_year(year: i64) -> Result<i64, ValidationError> {
    if (FOUNDING_YEAR_MIN..=FOUNDING_YEAR_MAX).contains(&year) {
        Ok(year)
    } else {
        Err(ValidationError::new(
            "Founding year must be between 1600 and 2023",
        ))
    }
}

/// A book's page count must be a positive integer.
pub fn validate_page_count(count: i64) -> Result<i64, ValidationError> {
    if count > 0 {
        Ok(count)
    } else {
        Err(ValidationError::new("Page count must be greater than 0"))
    }
}

/// Require a non-empty string field, pushing one error per failure mode.
pub(crate) fn required_string(
    body: &Map<String, Value>,
    key: &str,
    label: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    match body.get(key) {
        None | Some(Value::Null) => {
            errors.push(ValidationError::new(format!("{} is required", label)));
            None
        }
        Some(v) => string_value(v, label, errors),
    }
}

/// Require an integer field.
pub(crate) fn required_integer(
    body: &Map<String, Value>,
    key: &str,
    label: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<i64> {
    match body.get(key) {
        None | Some(Value::Null) => {
            errors.push(ValidationError::new(format!("{} is required", label)));
            None
        }
        Some(v) => integer_value(v, label, errors),
    }
}

pub(crate) fn string_value(
    v: &Value,
    label: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    match v.as_str() {
        Some(s) if !s.trim().is_empty() => Some(s.to_string()),
        Some(_) => {
            errors.push(ValidationError::new(format!("{} must not be empty", label)));
            None
        }
        None => {
            errors.push(ValidationError::new(format!("{} must be a string", label)));
            None
        }
    }
}

pub(crate) fn integer_value(
    v: &Value,
    label: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<i64> {
    match v.as_i64() {
        Some(n) => Some(n),
        None => {
            errors.push(ValidationError::new(format!("{} must be an integer", label)));
            None
        }
    }
}

/// Fold a rule result into the error list, keeping the value on success.
pub(crate) fn collect(
    result: Result<i64, ValidationError>,
    errors: &mut Vec<ValidationError>,
) -> Option<i64> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}
