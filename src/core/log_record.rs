//! Log record structure and the builder that completes partial input

use super::error::Result;
use super::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A complete, immutable log record.
///
/// Records are built once per emitted call and handed to sinks behind an
/// `Arc`, so a sink may keep a shared reference without copying.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    timestamp: DateTime<Utc>,
    level: Severity,
    context: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_name: Option<String>,
    process_id: String,
}

impl LogRecord {
    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    /// Never `Severity::None`.
    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    pub fn process_id(&self) -> &str {
        &self.process_id
    }

    /// Serialize as a single-line JSON object
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Defaults shared by every record a manager builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDefaults {
    pub context: String,
    pub level: Severity,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub process_id: String,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            context: String::new(),
            level: Severity::Log,
            device_id: None,
            device_name: None,
            process_id: std::process::id().to_string(),
        }
    }
}

/// Partial record input; missing fields are filled from [`RecordDefaults`].
///
/// # Example
///
/// ```
/// use axe_logger::{PartialLogRecord, RecordDefaults, Severity};
///
/// let record = PartialLogRecord::new()
///     .level(Severity::Warn)
///     .message("disk almost full")
///     .build(&RecordDefaults::default());
///
/// assert_eq!(record.level(), Severity::Warn);
/// assert_eq!(record.context(), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialLogRecord {
    timestamp: Option<DateTime<Utc>>,
    level: Option<Severity>,
    context: Option<String>,
    message: Option<String>,
    device_id: Option<String>,
    device_name: Option<String>,
    process_id: Option<String>,
}

impl PartialLogRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// `Severity::None` is treated as absent.
    #[must_use]
    pub fn level(mut self, level: Severity) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    #[must_use]
    pub fn device_name(mut self, device_name: impl Into<String>) -> Self {
        self.device_name = Some(device_name.into());
        self
    }

    #[must_use]
    pub fn process_id(mut self, process_id: impl Into<String>) -> Self {
        self.process_id = Some(process_id.into());
        self
    }

    /// Complete the record: caller value, else the shared default, else the
    /// fixed fallback (`log` for the level, now for the timestamp).
    pub fn build(self, defaults: &RecordDefaults) -> LogRecord {
        let level = self
            .level
            .filter(|l| !l.is_none())
            .or_else(|| Some(defaults.level).filter(|l| !l.is_none()))
            .unwrap_or(Severity::Log);

        LogRecord {
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            level,
            context: self.context.unwrap_or_else(|| defaults.context.clone()),
            message: self.message.unwrap_or_default(),
            device_id: self.device_id.or_else(|| defaults.device_id.clone()),
            device_name: self.device_name.or_else(|| defaults.device_name.clone()),
            process_id: self
                .process_id
                .unwrap_or_else(|| defaults.process_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn defaults() -> RecordDefaults {
        RecordDefaults {
            context: "app".to_string(),
            level: Severity::Debug,
            device_id: Some("dev-1".to_string()),
            device_name: Some("gateway".to_string()),
            process_id: "4242".to_string(),
        }
    }

    #[test]
    fn test_empty_partial_uses_defaults() {
        let record = PartialLogRecord::new().build(&defaults());
        assert_eq!(record.context(), "app");
        assert_eq!(record.level(), Severity::Debug);
        assert_eq!(record.message(), "");
        assert_eq!(record.device_id(), Some("dev-1"));
        assert_eq!(record.device_name(), Some("gateway"));
        assert_eq!(record.process_id(), "4242");
    }

    #[test]
    fn test_caller_values_win() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap();
        let record = PartialLogRecord::new()
            .timestamp(ts)
            .level(Severity::Error)
            .context("db")
            .message("connection lost")
            .device_id("dev-2")
            .process_id("7")
            .build(&defaults());

        assert_eq!(*record.timestamp(), ts);
        assert_eq!(record.level(), Severity::Error);
        assert_eq!(record.context(), "db");
        assert_eq!(record.message(), "connection lost");
        assert_eq!(record.device_id(), Some("dev-2"));
        assert_eq!(record.device_name(), Some("gateway"));
        assert_eq!(record.process_id(), "7");
    }

    #[test]
    fn test_none_level_never_reaches_record() {
        let record = PartialLogRecord::new()
            .level(Severity::None)
            .build(&defaults());
        assert_eq!(record.level(), Severity::Debug);

        let bad_defaults = RecordDefaults {
            level: Severity::None,
            ..RecordDefaults::default()
        };
        let record = PartialLogRecord::new()
            .level(Severity::None)
            .build(&bad_defaults);
        assert_eq!(record.level(), Severity::Log);
    }

    #[test]
    fn test_fixed_fallbacks() {
        let record = PartialLogRecord::new().build(&RecordDefaults::default());
        assert_eq!(record.context(), "");
        assert_eq!(record.level(), Severity::Log);
        assert_eq!(record.process_id(), std::process::id().to_string());
        assert!(record.device_id().is_none());
    }

    #[test]
    fn test_to_json() {
        let record = PartialLogRecord::new()
            .level(Severity::Warn)
            .context("net")
            .message("retrying")
            .build(&RecordDefaults::default());
        let json = record.to_json().unwrap();
        assert!(json.contains("\"level\":\"warn\""));
        assert!(json.contains("\"context\":\"net\""));
        assert!(json.contains("\"processId\""));
        assert!(!json.contains("deviceId"));
    }
}
