//! Logger facade bound to a log manager

use super::{
    log_record::PartialLogRecord,
    manager::{LogManager, ManagerInner},
    message::Message,
    severity::Severity,
    sink_filter::SinkFilter,
};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

struct LoggerInner {
    context: Option<String>,
    min_level: RwLock<Option<Severity>>,
    sink_filter: RwLock<SinkFilter>,
    /// Non-owning; empty while detached
    manager: RwLock<Weak<ManagerInner>>,
}

/// Per-context logging handle.
///
/// A logger is bound to at most one [`LogManager`] and never owns it. While
/// detached (never added, removed, or its manager is gone) every emit
/// operation is a silent no-op. Clones share identity, binding and filters.
///
/// # Example
///
/// ```
/// use axe_logger::{LogManager, ObservableSink, Severity};
///
/// let manager = LogManager::new();
/// let sink = manager.add_sink(ObservableSink::new()).unwrap();
/// let records = sink.subscribe();
///
/// let logger = manager.create_logger(Some("auth"));
/// logger.set_min_level(Some(Severity::Warn));
/// logger.log("dropped by the logger's own gate");
/// logger.warn(("token expires in", 30, "s"));
///
/// assert_eq!(records.try_recv().unwrap().message(), "token expires in 30 s");
/// assert!(records.try_recv().is_err());
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    /// A detached logger without its own context
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A detached logger with a context
    #[must_use]
    pub fn with_context(context: impl Into<String>) -> Self {
        Self::build(Some(context.into()))
    }

    fn build(context: Option<String>) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                context,
                min_level: RwLock::new(None),
                sink_filter: RwLock::new(SinkFilter::new()),
                manager: RwLock::new(Weak::new()),
            }),
        }
    }

    /// `None` means records fall back to the manager's common context.
    pub fn context(&self) -> Option<&str> {
        self.inner.context.as_deref()
    }

    /// The manager this logger is bound to, if any
    pub fn manager(&self) -> Option<LogManager> {
        self.inner.manager.read().upgrade().map(LogManager::from_inner)
    }

    pub fn is_attached(&self) -> bool {
        self.inner.manager.read().strong_count() > 0
    }

    pub(crate) fn bind(&self, manager: Weak<ManagerInner>) {
        *self.inner.manager.write() = manager;
    }

    pub(crate) fn unbind(&self) {
        *self.inner.manager.write() = Weak::new();
    }

    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn min_level(&self) -> Option<Severity> {
        *self.inner.min_level.read()
    }

    /// Local gate checked before anything reaches the manager.
    /// `None` disables the gate.
    pub fn set_min_level(&self, level: Option<Severity>) {
        *self.inner.min_level.write() = level;
    }

    /// Snapshot of this logger's sink filter override
    pub fn sink_filter(&self) -> SinkFilter {
        self.inner.sink_filter.read().clone()
    }

    pub fn with_sink_filter<R>(&self, f: impl FnOnce(&mut SinkFilter) -> R) -> R {
        f(&mut self.inner.sink_filter.write())
    }

    /// Override one sink's filter for this logger only
    pub fn set_sink_filter(&self, sink_name: impl Into<String>, level: Severity) {
        self.inner.sink_filter.write().set(sink_name, level);
    }

    fn passes_local_gate(&self, level: Severity) -> bool {
        match *self.inner.min_level.read() {
            Some(gate) => level.satisfies(gate),
            None => true,
        }
    }

    /// Emit `message` at `level`. `Severity::None` is never emitted.
    pub fn emit<M: Message>(&self, level: Severity, message: M) {
        let Some(manager) = self.manager() else {
            return;
        };
        if level.is_none() || !self.passes_local_gate(level) {
            return;
        }

        let mut partial = PartialLogRecord::new()
            .level(level)
            .message(message.into_message());
        if let Some(context) = &self.inner.context {
            partial = partial.context(context.clone());
        }

        // Snapshot, so a sink may change this logger's override mid-dispatch
        let filter = {
            let filter = self.inner.sink_filter.read();
            (!filter.is_empty()).then(|| filter.clone())
        };
        manager.dispatch_partial(partial, filter.as_ref());
    }

    pub fn error<M: Message>(&self, message: M) {
        self.emit(Severity::Error, message);
    }

    pub fn warn<M: Message>(&self, message: M) {
        self.emit(Severity::Warn, message);
    }

    pub fn log<M: Message>(&self, message: M) {
        self.emit(Severity::Log, message);
    }

    pub fn debug<M: Message>(&self, message: M) {
        self.emit(Severity::Debug, message);
    }

    pub fn verbose<M: Message>(&self, message: M) {
        self.emit(Severity::Verbose, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Logger {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Logger {}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("context", &self.inner.context)
            .field("min_level", &self.min_level())
            .field("attached", &self.is_attached())
            .finish()
    }
}
