//! Sink trait for log record destinations

use super::{log_record::LogRecord, severity::Severity};
use std::any::Any;
use std::sync::Arc;

/// Upcast to `Any` so the manager can hand out concrete sink types.
pub trait AsAnySink {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAnySink for T {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A named, independently filtered destination for log records.
///
/// `handle` is called synchronously during dispatch and must return
/// promptly. Any I/O belongs on the sink's own thread, and failures must be
/// contained inside the sink: nothing may escape `handle`.
///
/// `destroy` is called by the manager when the sink is removed. It must be
/// safe to call more than once, and a `handle` call racing with removal
/// must be harmless once the sink is destroyed. The manager holds no lock
/// while calling `handle` or `destroy`, so both may log through it.
///
/// # Example
///
/// ```
/// use axe_logger::{LogRecord, Severity, Sink};
/// use parking_lot::RwLock;
/// use std::sync::Arc;
///
/// struct CountingSink {
///     min_level: RwLock<Severity>,
///     seen: RwLock<usize>,
/// }
///
/// impl Sink for CountingSink {
///     fn name(&self) -> &str {
///         "counting"
///     }
///
///     fn min_level(&self) -> Severity {
///         *self.min_level.read()
///     }
///
///     fn set_min_level(&self, level: Severity) {
///         *self.min_level.write() = level;
///     }
///
///     fn handle(&self, _record: &Arc<LogRecord>) {
///         *self.seen.write() += 1;
///     }
///
///     fn destroy(&self) {}
/// }
/// ```
pub trait Sink: AsAnySink + Send + Sync + 'static {
    /// Unique within one manager
    fn name(&self) -> &str;

    fn min_level(&self) -> Severity;

    fn set_min_level(&self, level: Severity);

    fn handle(&self, record: &Arc<LogRecord>);

    fn destroy(&self);
}
