//! Log manager: sink registry, logger registry and the dispatch algorithm

use super::{
    error::{LoggerError, Result},
    log_record::{LogRecord, PartialLogRecord, RecordDefaults},
    logger::Logger,
    metrics::DispatchMetrics,
    severity::Severity,
    sink::Sink,
    sink_filter::SinkFilter,
};
use crate::sinks::ConsoleSink;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Name of the console sink registered on the default manager
pub const CONSOLE_SINK: &str = "Console";

static DEFAULT_MANAGER: OnceLock<LogManager> = OnceLock::new();

/// Configuration for a [`LogManager`]
///
/// # Example
///
/// ```
/// use axe_logger::{LogManager, ManagerConfig};
///
/// let config: ManagerConfig = serde_json::from_str(
///     r#"{ "with_default_console_sink": false, "defaults": { "context": "api" } }"#,
/// ).unwrap();
/// let manager = LogManager::with_config(config);
///
/// assert_eq!(manager.sink_count(), 0);
/// assert_eq!(manager.common_context(), "api");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Register a console sink named [`CONSOLE_SINK`] on construction
    pub with_default_console_sink: bool,
    /// Minimum level of the default console sink
    pub console_min_level: Severity,
    /// Colorize default console output
    pub console_colors: bool,
    /// Defaults for fields a record was built without
    pub defaults: RecordDefaults,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            with_default_console_sink: true,
            console_min_level: Severity::Verbose,
            console_colors: true,
            defaults: RecordDefaults::default(),
        }
    }
}

pub(crate) struct ManagerInner {
    /// Registration order is dispatch order
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
    loggers: Mutex<Vec<Logger>>,
    defaults: RwLock<RecordDefaults>,
    common_filter: RwLock<SinkFilter>,
    metrics: DispatchMetrics,
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        for sink in self.sinks.get_mut().drain(..) {
            sink.destroy();
        }
    }
}

/// Owns the sinks, tracks the loggers bound to it, and fans records out.
///
/// `LogManager` is a cheap handle; clones refer to the same manager. Loggers
/// only hold a non-owning handle, so the manager (and every sink it owns)
/// is torn down when the last `LogManager` handle is dropped.
///
/// # Example
///
/// ```
/// use axe_logger::{LogManager, ObservableSink, Severity};
///
/// let manager = LogManager::new();
/// let stream = manager
///     .add_sink(ObservableSink::new().with_min_level(Severity::Log))
///     .unwrap();
/// let records = stream.subscribe();
///
/// let logger = manager.create_logger(Some("billing"));
/// logger.log(("invoice", 1017, "sent"));
/// logger.debug("not delivered: above the sink's ceiling");
///
/// let record = records.try_recv().unwrap();
/// assert_eq!(record.context(), "billing");
/// assert_eq!(record.message(), "invoice 1017 sent");
/// assert!(records.try_recv().is_err());
/// ```
#[derive(Clone)]
pub struct LogManager {
    pub(crate) inner: Arc<ManagerInner>,
}

impl LogManager {
    /// An empty manager: no sinks, no loggers, fallback defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::from_defaults(RecordDefaults::default())
    }

    fn from_defaults(defaults: RecordDefaults) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                sinks: RwLock::new(Vec::new()),
                loggers: Mutex::new(Vec::new()),
                defaults: RwLock::new(defaults),
                common_filter: RwLock::new(SinkFilter::new()),
                metrics: DispatchMetrics::new(),
            }),
        }
    }

    #[must_use]
    pub fn with_config(config: ManagerConfig) -> Self {
        let manager = Self::from_defaults(config.defaults);

        if config.with_default_console_sink {
            let console = ConsoleSink::new()
                .with_name(CONSOLE_SINK)
                .with_min_level(config.console_min_level)
                .with_colors(config.console_colors);
            if let Err(e) = manager.add_sink(console) {
                eprintln!("[LOGGER ERROR] Failed to register default console sink: {}", e);
            }
        }

        manager
    }

    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    pub(crate) fn from_inner(inner: Arc<ManagerInner>) -> Self {
        Self { inner }
    }

    pub fn ptr_eq(&self, other: &LogManager) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ===== Loggers

    /// Create a logger bound to this manager
    pub fn create_logger(&self, context: Option<&str>) -> Logger {
        let logger = match context {
            Some(context) => Logger::with_context(context),
            None => Logger::new(),
        };
        self.add_logger(&logger);
        logger
    }

    /// Bind `logger` to this manager, detaching it from its previous one.
    pub fn add_logger(&self, logger: &Logger) {
        if let Some(previous) = logger.manager() {
            previous.remove_logger(logger);
        }
        logger.bind(Arc::downgrade(&self.inner));
        self.inner.loggers.lock().push(logger.clone());
    }

    /// Unregister `logger` and clear its binding if it points here.
    /// The logger itself stays usable; it just drops everything until re-added.
    pub fn remove_logger(&self, logger: &Logger) {
        self.inner.loggers.lock().retain(|l| !l.ptr_eq(logger));
        if logger.manager().is_some_and(|m| m.ptr_eq(self)) {
            logger.unbind();
        }
    }

    /// Snapshot of the loggers registered here, for centralized reconfiguration
    pub fn loggers(&self) -> Vec<Logger> {
        self.inner.loggers.lock().clone()
    }

    pub fn logger_count(&self) -> usize {
        self.inner.loggers.lock().len()
    }

    // ===== Sinks

    /// Register a sink and return a shared handle to it.
    ///
    /// Fails without touching the registry when the name is already taken.
    /// The rejected sink is dropped.
    pub fn add_sink<S: Sink>(&self, sink: S) -> Result<Arc<S>> {
        let sink = Arc::new(sink);
        self.add_shared_sink(Arc::clone(&sink) as Arc<dyn Sink>)?;
        Ok(sink)
    }

    pub fn add_shared_sink(&self, sink: Arc<dyn Sink>) -> Result<()> {
        let mut sinks = self.inner.sinks.write();
        if sinks.iter().any(|s| s.name() == sink.name()) {
            return Err(LoggerError::sink_name_conflict(sink.name()));
        }
        sinks.push(sink);
        Ok(())
    }

    pub fn find_sink_by_name(&self, name: &str) -> Option<Arc<dyn Sink>> {
        self.inner
            .sinks
            .read()
            .iter()
            .find(|s| s.name() == name)
            .cloned()
    }

    /// First registered sink of type `T`
    pub fn find_sink_by_type<T: Sink>(&self) -> Option<Arc<T>> {
        self.inner.sinks.read().iter().find_map(|sink| {
            <dyn Sink as super::sink::AsAnySink>::into_any(Arc::clone(sink))
                .downcast::<T>()
                .ok()
        })
    }

    /// Destroy and remove `sink`. No-op when it is not registered here.
    pub fn remove_sink<S: Sink + ?Sized>(&self, sink: &Arc<S>) -> bool {
        let target = Arc::as_ptr(sink).cast::<()>();
        self.remove_where(|s| Arc::as_ptr(s).cast::<()>() == target)
    }

    /// Destroy and remove the sink called `name`. No-op when absent.
    pub fn remove_sink_by_name(&self, name: &str) -> bool {
        self.remove_where(|s| s.name() == name)
    }

    fn remove_where(&self, matches: impl Fn(&Arc<dyn Sink>) -> bool) -> bool {
        let removed = {
            let mut sinks = self.inner.sinks.write();
            let position = sinks.iter().position(|s| matches(s));
            position.map(|idx| sinks.remove(idx))
        };

        // Unregistered first, destroyed outside the lock: a sink's teardown
        // may log through this manager.
        match removed {
            Some(sink) => {
                sink.destroy();
                true
            }
            None => false,
        }
    }

    /// Destroy and remove every sink, in registration order
    pub fn remove_all_sinks(&self) {
        let removed: Vec<Arc<dyn Sink>> = self.inner.sinks.write().drain(..).collect();
        for sink in removed {
            sink.destroy();
        }
    }

    fn is_registered(&self, sink: &Arc<dyn Sink>) -> bool {
        let target = Arc::as_ptr(sink).cast::<()>();
        self.inner
            .sinks
            .read()
            .iter()
            .any(|s| Arc::as_ptr(s).cast::<()>() == target)
    }

    pub fn sink_count(&self) -> usize {
        self.inner.sinks.read().len()
    }

    /// Snapshot of every sink's own minimum level
    pub fn read_filters(&self) -> BTreeMap<String, Severity> {
        self.inner
            .sinks
            .read()
            .iter()
            .map(|s| (s.name().to_string(), s.min_level()))
            .collect()
    }

    /// Set the named sink's minimum level; ignored when no such sink exists.
    pub fn set_filter(&self, sink_name: &str, level: Severity) {
        if let Some(sink) = self.inner.sinks.read().iter().find(|s| s.name() == sink_name) {
            sink.set_min_level(level);
        }
    }

    /// Manager-wide override consulted after a logger's own override
    pub fn common_filter(&self) -> SinkFilter {
        self.inner.common_filter.read().clone()
    }

    pub fn with_common_filter<R>(&self, f: impl FnOnce(&mut SinkFilter) -> R) -> R {
        f(&mut self.inner.common_filter.write())
    }

    // ===== Common defaults

    pub fn defaults(&self) -> RecordDefaults {
        self.inner.defaults.read().clone()
    }

    pub fn common_context(&self) -> String {
        self.inner.defaults.read().context.clone()
    }

    pub fn set_common_context(&self, context: impl Into<String>) {
        self.inner.defaults.write().context = context.into();
    }

    pub fn common_level(&self) -> Severity {
        self.inner.defaults.read().level
    }

    /// Records cannot carry `none`, so it is rejected here.
    pub fn set_common_level(&self, level: Severity) -> Result<()> {
        if level.is_none() {
            return Err(LoggerError::config(
                "LogManager",
                "common level cannot be none",
            ));
        }
        self.inner.defaults.write().level = level;
        Ok(())
    }

    pub fn set_common_device_id(&self, device_id: Option<String>) {
        self.inner.defaults.write().device_id = device_id;
    }

    pub fn set_common_device_name(&self, device_name: Option<String>) {
        self.inner.defaults.write().device_name = device_name;
    }

    pub fn set_common_process_id(&self, process_id: impl Into<String>) {
        self.inner.defaults.write().process_id = process_id.into();
    }

    // ===== Dispatch

    /// Complete a partial record with this manager's defaults
    pub fn build_record(&self, partial: PartialLogRecord) -> LogRecord {
        partial.build(&self.inner.defaults.read())
    }

    /// Build a record and dispatch it
    pub fn dispatch_partial(&self, partial: PartialLogRecord, filter: Option<&SinkFilter>) {
        let record = Arc::new(self.build_record(partial));
        self.dispatch(&record, filter);
    }

    /// Deliver `record` to every sink whose effective filter admits it, in
    /// registration order.
    ///
    /// The effective filter for a sink is the first defined of: `filter`
    /// (a logger's override), the manager-wide common filter, the sink's own
    /// minimum level. Overrides are only read, never written back.
    ///
    /// No registry lock is held while a sink handles the record, so `handle`
    /// may reconfigure this manager. A sink removed by an earlier sink during
    /// this dispatch is skipped.
    pub fn dispatch(&self, record: &Arc<LogRecord>, filter: Option<&SinkFilter>) {
        let metrics = &self.inner.metrics;
        metrics.record_dispatched();

        let sinks: Vec<Arc<dyn Sink>> = self.inner.sinks.read().clone();

        for sink in &sinks {
            if !self.is_registered(sink) {
                continue;
            }

            let name = sink.name();
            let common = self.inner.common_filter.read().get(name);
            let effective = filter
                .and_then(|f| f.get(name))
                .or(common)
                .unwrap_or_else(|| sink.min_level());

            if record.level().satisfies(effective) {
                metrics.record_delivered();
                sink.handle(record);
            } else {
                metrics.record_suppressed();
            }
        }
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.inner.metrics
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sinks: Vec<String> = self
            .inner
            .sinks
            .read()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        f.debug_struct("LogManager")
            .field("sinks", &sinks)
            .field("loggers", &self.logger_count())
            .finish()
    }
}

/// Builder for [`LogManager`]
///
/// # Example
///
/// ```
/// use axe_logger::{LogManager, ObservableSink, Severity};
///
/// let manager = LogManager::builder()
///     .common_context("worker")
///     .common_level(Severity::Debug)
///     .sink(ObservableSink::new())
///     .build()
///     .unwrap();
///
/// assert_eq!(manager.sink_count(), 1);
/// ```
pub struct ManagerBuilder {
    config: ManagerConfig,
    sinks: Vec<Arc<dyn Sink>>,
}

impl ManagerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ManagerConfig {
                with_default_console_sink: false,
                ..ManagerConfig::default()
            },
            sinks: Vec::new(),
        }
    }

    #[must_use]
    pub fn default_console_sink(mut self, enabled: bool) -> Self {
        self.config.with_default_console_sink = enabled;
        self
    }

    #[must_use]
    pub fn console_min_level(mut self, level: Severity) -> Self {
        self.config.console_min_level = level;
        self
    }

    #[must_use]
    pub fn console_colors(mut self, enabled: bool) -> Self {
        self.config.console_colors = enabled;
        self
    }

    #[must_use]
    pub fn common_context(mut self, context: impl Into<String>) -> Self {
        self.config.defaults.context = context.into();
        self
    }

    #[must_use]
    pub fn common_level(mut self, level: Severity) -> Self {
        self.config.defaults.level = level;
        self
    }

    #[must_use]
    pub fn device(mut self, device_id: impl Into<String>, device_name: impl Into<String>) -> Self {
        self.config.defaults.device_id = Some(device_id.into());
        self.config.defaults.device_name = Some(device_name.into());
        self
    }

    #[must_use]
    pub fn sink<S: Sink>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    pub fn build(self) -> Result<LogManager> {
        if self.config.defaults.level.is_none() {
            return Err(LoggerError::config(
                "LogManager",
                "common level cannot be none",
            ));
        }

        let manager = LogManager::with_config(self.config);
        for sink in self.sinks {
            manager.add_shared_sink(sink)?;
        }
        Ok(manager)
    }
}

impl Default for ManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide default manager.
///
/// Created on first use with [`ManagerConfig::default`]: a console sink named
/// [`CONSOLE_SINK`] is constructed first, then the manager, then the sink is
/// registered. Use [`init_default_manager`] before first use to configure it.
pub fn default_manager() -> &'static LogManager {
    DEFAULT_MANAGER.get_or_init(|| LogManager::with_config(ManagerConfig::default()))
}

/// Initialize the process-wide default manager explicitly.
///
/// Fails with [`LoggerError::AlreadyInitialized`] once the default manager
/// exists, whether it was created here or lazily by [`default_manager`].
pub fn init_default_manager(config: ManagerConfig) -> Result<&'static LogManager> {
    let mut created = false;
    let manager = DEFAULT_MANAGER.get_or_init(|| {
        created = true;
        LogManager::with_config(config)
    });

    if created {
        Ok(manager)
    } else {
        Err(LoggerError::AlreadyInitialized)
    }
}

/// Create a logger on the default manager
pub fn logger(context: &str) -> Logger {
    default_manager().create_logger(Some(context))
}
