use chrono::{NaiveDate, NaiveTime};
use stafflow_core::{AppError, AppResult, RecordId};
use uuid::Uuid;

pub mod attendance;
pub mod clients;
pub mod directory;
pub mod health;
pub mod leads;
pub mod leave;
pub mod navigation;
pub mod payroll;
pub mod security;
pub mod tasks;
pub mod tickets;
pub mod timesheets;

/// Parses a `YYYY-MM-DD` transport value.
fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|error| AppError::Validation(format!("invalid date '{value}': {error}")))
}

/// Parses an optional `HH:MM` or `HH:MM:SS` transport value.
fn parse_time(value: Option<&str>) -> AppResult<Option<NaiveTime>> {
    value
        .map(|value| {
            NaiveTime::parse_from_str(value, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
                .map_err(|error| AppError::Validation(format!("invalid time '{value}': {error}")))
        })
        .transpose()
}

/// Parses a UUID path segment into a record id.
fn parse_record_id(value: &str) -> AppResult<RecordId> {
    Uuid::parse_str(value)
        .map(RecordId::from_uuid)
        .map_err(|error| AppError::Validation(format!("invalid record id '{value}': {error}")))
}
