//! Console sink implementation

use crate::core::{LogRecord, Severity, Sink, TimestampFormat};
#[cfg(feature = "console")]
use colored::Colorize;
use parking_lot::RwLock;
use std::io::Write;
use std::sync::Arc;

/// Writes `[timestamp]  LEVEL  [context]  message` lines to the terminal.
///
/// Error records go to stderr, everything else to stdout. Colors need the
/// `console` feature.
pub struct ConsoleSink {
    name: String,
    min_level: RwLock<Severity>,
    use_colors: bool,
    show_timestamp: bool,
    show_level: bool,
    show_context: bool,
    timestamp_format: TimestampFormat,
}

impl ConsoleSink {
    pub const DEFAULT_NAME: &'static str = "ConsoleSink";

    pub fn new() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            min_level: RwLock::new(Severity::Debug),
            use_colors: true,
            show_timestamp: true,
            show_level: true,
            show_context: true,
            timestamp_format: TimestampFormat::default(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_min_level(self, level: Severity) -> Self {
        *self.min_level.write() = level;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn show_timestamp(mut self, show: bool) -> Self {
        self.show_timestamp = show;
        self
    }

    #[must_use]
    pub fn show_level(mut self, show: bool) -> Self {
        self.show_level = show;
        self
    }

    #[must_use]
    pub fn show_context(mut self, show: bool) -> Self {
        self.show_context = show;
        self
    }

    /// Set the timestamp format for this sink
    ///
    /// # Examples
    ///
    /// ```
    /// use axe_logger::{ConsoleSink, TimestampFormat};
    ///
    /// let sink = ConsoleSink::new()
    ///     .with_timestamp_format(TimestampFormat::Iso8601Micros);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Render one record as a console line, without the trailing newline.
    /// Hidden columns are left out entirely.
    pub fn format_record(&self, record: &LogRecord) -> String {
        let level = record.level();
        let mut columns = Vec::with_capacity(4);

        if self.show_timestamp {
            columns.push(format!("[{}]", self.timestamp_format.format(record.timestamp())));
        }
        if self.show_level {
            columns.push(self.paint(level.padded_name(), level, false));
        }
        if self.show_context {
            columns.push(self.paint(&format!("[{}]", record.context()), level, true));
        }
        columns.push(self.paint(record.message(), level, false));

        columns.join("  ")
    }

    #[cfg(feature = "console")]
    fn paint(&self, text: &str, level: Severity, is_context: bool) -> String {
        if !self.use_colors {
            return text.to_string();
        }
        if is_context {
            text.yellow().to_string()
        } else {
            text.color(level_color(level)).to_string()
        }
    }

    #[cfg(not(feature = "console"))]
    fn paint(&self, text: &str, _level: Severity, _is_context: bool) -> String {
        text.to_string()
    }
}

#[cfg(feature = "console")]
fn level_color(level: Severity) -> colored::Color {
    use colored::Color::*;
    match level {
        Severity::None => BrightRed,
        Severity::Error => Red,
        Severity::Warn => Yellow,
        Severity::Log => Blue,
        Severity::Debug => Magenta,
        Severity::Verbose => BrightBlack,
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn min_level(&self) -> Severity {
        *self.min_level.read()
    }

    fn set_min_level(&self, level: Severity) {
        *self.min_level.write() = level;
    }

    fn handle(&self, record: &Arc<LogRecord>) {
        let line = self.format_record(record);

        // A closed terminal must not take the caller down
        let _ = match record.level() {
            Severity::Error => writeln!(std::io::stderr().lock(), "{}", line),
            _ => writeln!(std::io::stdout().lock(), "{}", line),
        };
    }

    fn destroy(&self) {
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PartialLogRecord, RecordDefaults};
    use chrono::TimeZone;
    use chrono::Utc;

    #[test]
    fn test_defaults() {
        let sink = ConsoleSink::new();
        assert_eq!(sink.name(), ConsoleSink::DEFAULT_NAME);
        assert_eq!(sink.min_level(), Severity::Debug);
    }

    #[test]
    fn test_plain_format() {
        let sink = ConsoleSink::new().with_colors(false);
        let ts = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single().unwrap();
        let record = PartialLogRecord::new()
            .timestamp(ts)
            .level(Severity::Warn)
            .context("db")
            .message("slow query")
            .build(&RecordDefaults::default());

        assert_eq!(
            sink.format_record(&record),
            "[2025-01-08T10:30:45.000Z]  WARN   [db]  slow query"
        );
    }

    #[test]
    fn test_hidden_columns() {
        let record = PartialLogRecord::new()
            .level(Severity::Error)
            .context("db")
            .message("down")
            .build(&RecordDefaults::default());

        let bare = ConsoleSink::new()
            .with_colors(false)
            .show_timestamp(false)
            .show_level(false)
            .show_context(false);
        assert_eq!(bare.format_record(&record), "down");

        let no_stamp = ConsoleSink::new().with_colors(false).show_timestamp(false);
        assert_eq!(no_stamp.format_record(&record), "ERROR  [db]  down");
    }

    #[test]
    fn test_min_level_is_mutable() {
        let sink = ConsoleSink::new().with_min_level(Severity::Error);
        sink.set_min_level(Severity::Verbose);
        assert_eq!(sink.min_level(), Severity::Verbose);
    }
}
