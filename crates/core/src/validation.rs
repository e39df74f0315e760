//! Input validation utilities.
//!
//! Dates and times typed by staff are stored verbatim in the context string and later shown
//! in the results message, so they are checked for shape before any write.

use crate::{IntakeError, IntakeResult};
use chrono::{NaiveDate, NaiveTime};

/// Validates a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns `IntakeError::InvalidInput` naming `field` if the value is not a real date.
pub fn validate_date(field: &str, value: &str) -> IntakeResult<()> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| IntakeError::InvalidInput(format!("{field} must be a YYYY-MM-DD date")))
}

/// Validates a 24-hour `HH:MM` time.
pub fn validate_time(field: &str, value: &str) -> IntakeResult<()> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map(|_| ())
        .map_err(|_| IntakeError::InvalidInput(format!("{field} must be an HH:MM time")))
}

/// Validates an optional dashboard date filter. Blank means "no filter" and is accepted.
pub fn validate_filter_date(value: Option<&str>) -> IntakeResult<()> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(date) => validate_date("date filter", date),
        None => Ok(()),
    }
}
