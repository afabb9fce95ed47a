//! In-process observable sink
//!
//! Republishes every handled record on crossbeam channels so other parts of
//! the application can follow the log stream.

use crate::core::{LogRecord, Severity, Sink};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Sink that fans records out to any number of subscribers.
///
/// Subscribers receive the same `Arc<LogRecord>` the manager dispatched.
/// A subscriber whose receiver is dropped is pruned on the next record, and
/// `destroy` ends every stream.
pub struct ObservableSink {
    name: String,
    min_level: RwLock<Severity>,
    subscribers: Mutex<Vec<Sender<Arc<LogRecord>>>>,
}

impl ObservableSink {
    pub const DEFAULT_NAME: &'static str = "ObservableSink";

    pub fn new() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            min_level: RwLock::new(Severity::Debug),
            subscribers: Mutex::new(Vec::new()),
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

    /// Open a new stream of records handled from now on
    pub fn subscribe(&self) -> Receiver<Arc<LogRecord>> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl Default for ObservableSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ObservableSink {
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
        self.subscribers
            .lock()
            .retain(|tx| tx.send(Arc::clone(record)).is_ok());
    }

    fn destroy(&self) {
        self.subscribers.lock().clear();
    }
}
