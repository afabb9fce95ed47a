//! # Axe Logger
//!
//! A structured logging facility. Named loggers emit leveled records to a
//! [`LogManager`], which fans each record out to every registered sink whose
//! effective filter admits it.
//!
//! ## Features
//!
//! - **Severity filtering**: per sink, per logger override, and manager-wide
//! - **Fan-out in registration order**: sinks never see records out of order
//! - **Buffered file output**: non-blocking writes with one writer thread per file
//! - **Observable stream**: subscribe to records from anywhere in the process
//!
//! ## Example
//!
//! ```
//! use axe_logger::prelude::*;
//!
//! let manager = LogManager::builder()
//!     .common_context("app")
//!     .sink(ObservableSink::new().with_min_level(Severity::Warn))
//!     .build()
//!     .unwrap();
//! let records = manager
//!     .find_sink_by_type::<ObservableSink>()
//!     .unwrap()
//!     .subscribe();
//!
//! let logger = manager.create_logger(Some("db"));
//! logger.warn(("pool exhausted after", 3, "retries"));
//! logger.log("not delivered");
//!
//! let record = records.try_recv().unwrap();
//! assert_eq!(record.level(), Severity::Warn);
//! assert_eq!(record.message(), "pool exhausted after 3 retries");
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        default_manager, logger, Inspect, LogManager, LogRecord, Logger, LoggerError,
        ManagerBuilder, ManagerConfig, Message, PartialLogRecord, Result, Severity, Sink,
        SinkFilter,
    };
    #[cfg(feature = "file")]
    pub use crate::sinks::{FileSink, StreamEvent, StreamState};
    pub use crate::sinks::{ConsoleSink, ObservableSink};
}

pub use core::{
    default_log_filename, default_manager, epoch_millis, init_default_manager, logger,
    path_safe_timestamp, AsAnySink, DispatchMetrics, Inspect, LogManager, LogRecord, Logger,
    LoggerError, ManagerBuilder, ManagerConfig, Message, MessagePart, PartialLogRecord,
    RecordDefaults, Result, Severity, Sink, SinkFilter, TimestampFormat, ALL_SINKS_KEY,
    CONSOLE_SINK,
};
#[cfg(feature = "file")]
pub use sinks::{
    FileSink, FileSinkBuilder, FileSinkConfig, LogFileInfo, StreamEvent, StreamState,
    DEFAULT_CLOSE_TIMEOUT,
};
pub use sinks::{ConsoleSink, ObservableSink};
