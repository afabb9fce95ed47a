//! Core logging types: severities, records, filters, the manager and loggers

pub mod error;
pub mod log_record;
pub mod logger;
pub mod manager;
pub mod message;
pub mod metrics;
pub mod severity;
pub mod sink;
pub mod sink_filter;
pub mod timestamp;

pub use error::{LoggerError, Result};
pub use log_record::{LogRecord, PartialLogRecord, RecordDefaults};
pub use logger::Logger;
pub use manager::{
    default_manager, init_default_manager, logger, LogManager, ManagerBuilder, ManagerConfig,
    CONSOLE_SINK,
};
pub use message::{Inspect, Message, MessagePart};
pub use metrics::DispatchMetrics;
pub use severity::Severity;
pub use sink::{AsAnySink, Sink};
pub use sink_filter::{SinkFilter, ALL_SINKS_KEY};
pub use timestamp::{default_log_filename, epoch_millis, path_safe_timestamp, TimestampFormat};
