//! Logging macros with `format!`-style arguments.
//!
//! Each macro formats its arguments and hands the resulting string to the
//! matching [`Logger`](crate::Logger) method, so the usual gates apply:
//! a detached logger drops the message and the local minimum level is
//! checked before anything reaches the manager.
//!
//! # Examples
//!
//! ```
//! use axe_logger::prelude::*;
//! use axe_logger::{log, warn};
//!
//! let manager = LogManager::new();
//! let logger = manager.create_logger(Some("http"));
//!
//! let port = 8080;
//! log!(logger, "listening on port {}", port);
//! warn!(logger, "{} connections pending", 12);
//! ```

/// Emit a formatted message at an explicit severity.
///
/// # Examples
///
/// ```
/// # use axe_logger::prelude::*;
/// # let logger = Logger::new();
/// use axe_logger::emit;
/// emit!(logger, Severity::Debug, "cache size: {}", 128);
/// ```
#[macro_export]
macro_rules! emit {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.emit($level, format!($($arg)+))
    };
}

/// Emit an error-level message.
///
/// ```
/// # use axe_logger::prelude::*;
/// # let logger = Logger::new();
/// use axe_logger::error;
/// error!(logger, "request failed with status {}", 500);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Severity::Error, $($arg)+)
    };
}

/// Emit a warn-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Severity::Warn, $($arg)+)
    };
}

/// Emit a log-level message.
///
/// ```
/// # use axe_logger::prelude::*;
/// # let logger = Logger::new();
/// use axe_logger::log;
/// log!(logger, "user {} signed in", "ada");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Severity::Log, $($arg)+)
    };
}

/// Emit a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Severity::Debug, $($arg)+)
    };
}

/// Emit a verbose-level message.
#[macro_export]
macro_rules! verbose {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Severity::Verbose, $($arg)+)
    };
}
