//! Centralized datetime handling utilities
//!
//! Tile timestamps are stored in SQLite as fixed-width UTC text so that the
//! expiry predicate can compare them as plain strings. Every value written to
//! the database must go through [`DateTimeParser::format_for_storage`].
//!
//! # Usage
//!
//! ```rust
//! use tileboard::utils::datetime::DateTimeParser;
//!
//! let dt = DateTimeParser::parse_flexible("2023-01-01T12:00:00Z").unwrap();
//! assert_eq!(
//!     DateTimeParser::format_for_storage(&dt),
//!     "2023-01-01 12:00:00.000000"
//! );
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Storage format: fixed microsecond precision keeps lexical and temporal order identical
const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Errors that can occur during datetime operations
#[derive(Error, Debug)]
pub enum DateTimeError {
    /// Invalid datetime format provided
    #[error("Invalid datetime format: '{input}' - expected formats: RFC3339 (2023-01-01T12:00:00Z) or SQLite (2023-01-01 12:00:00)")]
    InvalidFormat { input: String },
}

/// Centralized datetime parsing and formatting utilities
pub struct DateTimeParser;

impl DateTimeParser {
    /// Parse datetime from the formats that can appear in the tiles table
    ///
    /// Supports:
    /// - RFC3339 with timezone or offset: "2023-01-01T12:00:00Z"
    /// - SQLite format with optional fraction (assumes UTC): "2023-01-01 12:00:00.123456"
    /// - ISO without timezone (assumes UTC): "2023-01-01T12:00:00"
    pub fn parse_flexible(datetime_str: &str) -> Result<DateTime<Utc>, DateTimeError> {
        let trimmed = datetime_str.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.with_timezone(&Utc));
        }

        let naive_formats = [
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
        ];

        for format in &naive_formats {
            if let Ok(naive_dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(DateTime::from_naive_utc_and_offset(naive_dt, Utc));
            }
        }

        Err(DateTimeError::InvalidFormat {
            input: datetime_str.to_string(),
        })
    }

    /// Format datetime for storage in SQLite: "YYYY-MM-DD HH:MM:SS.ffffff"
    pub fn format_for_storage(dt: &DateTime<Utc>) -> String {
        dt.format(STORAGE_FORMAT).to_string()
    }

    /// Format datetime for API responses (RFC3339)
    pub fn format_for_api(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339()
    }
}

/// Serde serialization helper for datetime fields
///
/// Use this function with `#[serde(serialize_with = "serialize_datetime")]`
/// to ensure consistent datetime serialization across the application.
pub fn serialize_datetime<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    DateTimeParser::format_for_api(dt).serialize(serializer)
}

/// Serde helper for optional datetime fields
pub fn serialize_optional_datetime<S>(
    dt: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => serialize_datetime(dt, serializer),
        None => serializer.serialize_none(),
    }
}
