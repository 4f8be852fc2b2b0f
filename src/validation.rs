//! Field validation helpers
//!
//! Checks that run before any collaborator is consulted: required text,
//! required ids, and palette class parsing.

use crate::constants::StatusClass;
use crate::error::{JobFlowError, Result};

/// Fails with a validation error when `value` is empty or whitespace
pub fn require_text(field: &str, value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(JobFlowError::validation(field, message));
    }
    Ok(())
}

/// Fails with a validation error when `id` is not a positive id
pub fn require_id(field: &str, id: i64, message: &str) -> Result<()> {
    if id <= 0 {
        return Err(JobFlowError::validation(field, message));
    }
    Ok(())
}

/// Parses an optional palette class; blank input means "no class"
pub fn parse_status_class(class: Option<&str>) -> Result<Option<StatusClass>> {
    match class.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<StatusClass>().map(Some).map_err(|_| {
            JobFlowError::validation(
                "class",
                format!(
                    "class must be one of: {}",
                    StatusClass::ALL
                        .iter()
                        .map(StatusClass::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )
        }),
    }
}

/// Trims optional free text, collapsing blank values to `None`
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Treats zero and negative ids as "not set"
pub fn positive_id(id: Option<i64>) -> Option<i64> {
    id.filter(|value| *value > 0)
}
