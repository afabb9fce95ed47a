//! Timestamp formatting utilities
//!
//! Formats record timestamps for sink output and derives path-safe log
//! file names from the current time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Timestamp format options for line-oriented sinks
///
/// # Examples
///
/// ```
/// use axe_logger::TimestampFormat;
/// use chrono::Utc;
///
/// let stamp = TimestampFormat::Iso8601.format(&Utc::now());
/// assert!(stamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 format: `2025-01-08T10:30:45.123+00:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }
}

/// ISO 8601 timestamp with `:` replaced by `-` and `.` replaced by `_`,
/// usable as a file name on every common filesystem.
#[must_use]
pub fn path_safe_timestamp(datetime: &DateTime<Utc>) -> String {
    TimestampFormat::Iso8601
        .format(datetime)
        .replace(':', "-")
        .replace('.', "_")
}

/// Default log file name for a new generation: `<path-safe timestamp>.txt`
#[must_use]
pub fn default_log_filename() -> String {
    format!("{}.txt", path_safe_timestamp(&Utc::now()))
}

/// Milliseconds since the Unix epoch; times before the epoch clamp to zero.
#[must_use]
pub fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
