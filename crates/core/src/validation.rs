//! Input validation for lifecycle operations.
//!
//! Every check here runs before a transaction is opened. Failures are
//! [`CoreError::Validation`] with a field-level message.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum request title length, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum request note length, in characters.
pub const MAX_NOTE_LEN: usize = 2000;

/// Maximum number of photos attached to one request.
pub const MAX_PHOTOS: usize = 10;

/// Default lead time for urgent requests submitted without a start time.
pub const DEFAULT_URGENT_START_WINDOW_HOURS: i64 = 24;

/// Longest configurable lead time for urgent requests: one year.
pub const MAX_URGENT_START_WINDOW_HOURS: i64 = 24 * 365;

/// Check a configured urgent lead time against `0..=MAX_URGENT_START_WINDOW_HOURS`.
pub fn validate_urgent_window(hours: i64) -> Result<i64, CoreError> {
    if !(0..=MAX_URGENT_START_WINDOW_HOURS).contains(&hours) {
        return Err(CoreError::Validation(format!(
            "Urgent start window must be between 0 and {MAX_URGENT_START_WINDOW_HOURS} hours"
        )));
    }
    Ok(hours)
}

/// Validate and trim a request title.
pub fn validate_title(title: &str) -> Result<&str, CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("title: must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "title: must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(trimmed)
}

/// Validate an optional free-text note.
pub fn validate_note(note: Option<&str>) -> Result<(), CoreError> {
    match note {
        Some(n) if n.chars().count() > MAX_NOTE_LEN => Err(CoreError::Validation(format!(
            "note: must be at most {MAX_NOTE_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

/// Parse a UUID supplied by a caller, naming the offending field on failure.
pub fn parse_uuid(field: &str, value: &str) -> Result<Uuid, CoreError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| CoreError::Validation(format!("{field}: '{value}' is not a valid UUID")))
}

/// Parse a positive numeric row id supplied by a caller.
pub fn parse_id(field: &str, value: &str) -> Result<DbId, CoreError> {
    value
        .trim()
        .parse::<DbId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CoreError::Validation(format!("{field}: '{value}' is not a valid id")))
}

/// Parse an optional RFC 3339 timestamp. Blank input is treated as absent.
pub fn parse_timestamp(field: &str, value: Option<&str>) -> Result<Option<Timestamp>, CoreError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => DateTime::parse_from_rfc3339(v)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| {
                CoreError::Validation(format!("{field}: '{v}' is not an RFC 3339 timestamp"))
            }),
    }
}

/// Work out a request's start time.
///
/// An urgent request without an explicit start time begins `window_hours`
/// after `now`. Non-urgent requests keep whatever was supplied.
pub fn resolve_start_at(
    urgent: bool,
    start_at: Option<Timestamp>,
    now: Timestamp,
    window_hours: i64,
) -> Result<Option<Timestamp>, CoreError> {
    match (urgent, start_at) {
        (true, None) => Duration::try_hours(window_hours)
            .and_then(|window| now.checked_add_signed(window))
            .map(Some)
            .ok_or_else(|| {
                CoreError::Internal(format!("Urgent start window of {window_hours}h is out of range"))
            }),
        (_, start) => Ok(start),
    }
}

/// Bid amounts are positive integers in minor currency units.
pub fn validate_bid_amount(amount: i64) -> Result<(), CoreError> {
    if amount <= 0 {
        return Err(CoreError::Validation(format!(
            "amount: must be greater than zero, got {amount}"
        )));
    }
    Ok(())
}

/// Validate the photo URLs attached to a new request.
pub fn validate_photo_urls(photos: &[String]) -> Result<(), CoreError> {
    if photos.len() > MAX_PHOTOS {
        return Err(CoreError::Validation(format!(
            "photos: at most {MAX_PHOTOS} photos may be attached"
        )));
    }
    for (i, url) in photos.iter().enumerate() {
        let url = url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) || url.len() <= "https://".len() {
            return Err(CoreError::Validation(format!(
                "photos[{i}]: '{url}' is not an http(s) URL"
            )));
        }
    }
    Ok(())
}
