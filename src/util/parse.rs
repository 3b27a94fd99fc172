use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::AppError;

/// Format of calendar days, both in field maps and in stored records.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of opening and closing times.
pub const TIME_FORMAT: &str = "%H:%M";

/// Parses a calendar day supplied by a caller.
///
/// # Arguments
/// - `field` - Name of the field, for the error message
/// - `value` - Date formatted as `YYYY-MM-DD`
///
/// # Returns
/// - `Ok(NaiveDate)` - Successfully parsed date
/// - `Err(AppError::BadRequest)` - The value is not a valid calendar day
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| AppError::BadRequest(format!("Invalid date for {}: '{}' ({})", field, value, e)))
}

/// Parses a wall-clock time supplied by a caller, returning it normalised to `HH:MM`.
///
/// # Returns
/// - `Ok(String)` - Time formatted as `HH:MM`
/// - `Err(AppError::BadRequest)` - The value is not a valid `HH:MM` time
pub fn parse_time(field: &str, value: &str) -> Result<String, AppError> {
    let time = NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|e| AppError::BadRequest(format!("Invalid time for {}: '{}' ({})", field, value, e)))?;

    Ok(time.format(TIME_FORMAT).to_string())
}

/// Parses an unsigned integer supplied by a caller.
///
/// # Returns
/// - `Ok(u64)` - Successfully parsed value
/// - `Err(AppError::BadRequest)` - The value is not a non-negative integer
pub fn parse_u64(field: &str, value: &str) -> Result<u64, AppError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| AppError::BadRequest(format!("Invalid integer for {}: '{}' ({})", field, value, e)))
}

/// Parses a seat count or seat position supplied by a caller.
pub fn parse_u32(field: &str, value: &str) -> Result<u32, AppError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| AppError::BadRequest(format!("Invalid integer for {}: '{}' ({})", field, value, e)))
}

/// Formats a calendar day the way it is stored and used in listing keys.
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Current time truncated to whole seconds, the resolution timestamps are stored at.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}
