//! Built-in sink implementations

pub mod console;
#[cfg(feature = "file")]
pub mod file;
pub mod observable;

pub use console::ConsoleSink;
#[cfg(feature = "file")]
pub use file::{
    FileSink, FileSinkBuilder, FileSinkConfig, FilenameFn, LogFileInfo, StreamEvent,
    StreamEventCallback, StreamState, DEFAULT_CLOSE_TIMEOUT,
};
pub use observable::ObservableSink;
