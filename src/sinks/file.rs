//! Buffered file sink
//!
//! Appends one line per record to a log file in a configurable directory.
//! Each generation (one open/close cycle) gets its own file and its own
//! writer thread; `handle` never touches the disk.
//!
//! Stream lifecycle: `NoStream -> Opening -> Ready -> Closed`, with `Failed`
//! when the directory or file cannot be opened or a write fails. Lines
//! written while the stream is not ready wait in a FIFO buffer and are
//! flushed, in order, ahead of the first line written once it is ready.

use crate::core::{
    default_log_filename, epoch_millis, LogRecord, LoggerError, Result, Severity, Sink,
    TimestampFormat,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long `destroy` waits for the writer thread to flush and close
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Computes the file name of a new generation
pub type FilenameFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Receives stream notifications on the writer thread
pub type StreamEventCallback = Arc<dyn Fn(&StreamEvent) + Send + Sync>;

const OPENING: u8 = 0;
const READY: u8 = 1;
const FAILED: u8 = 2;
const CLOSED: u8 = 3;

/// Observable state of the sink's current stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    NoStream,
    Opening,
    Ready,
    Failed,
    Closed,
}

/// Notification from a stream's writer thread
#[derive(Debug)]
pub enum StreamEvent {
    Ready { path: PathBuf },
    Error { path: PathBuf, error: LoggerError },
    Closed { path: PathBuf },
}

/// One entry of [`FileSink::list_log_files`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFileInfo {
    pub filename: String,
    pub size: u64,
    pub created_epoch_ms: u64,
    pub modified_epoch_ms: u64,
}

/// Serializable part of the file sink configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSinkConfig {
    pub name: String,
    pub min_level: Severity,
    pub log_dir: PathBuf,
    /// Open the first generation on construction instead of on first write
    pub open_on_create: bool,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            name: FileSink::DEFAULT_NAME.to_string(),
            min_level: Severity::Log,
            log_dir: PathBuf::from("./logs"),
            open_on_create: true,
        }
    }
}

enum StreamCommand {
    Write(String),
    End,
}

/// Handle to one generation's writer thread
struct LogStream {
    path: PathBuf,
    sender: Sender<StreamCommand>,
    status: Arc<AtomicU8>,
    worker: Option<JoinHandle<()>>,
}

impl LogStream {
    fn state(&self) -> StreamState {
        match self.status.load(Ordering::Acquire) {
            OPENING => StreamState::Opening,
            READY => StreamState::Ready,
            FAILED => StreamState::Failed,
            _ => StreamState::Closed,
        }
    }

    fn is_ready(&self) -> bool {
        self.status.load(Ordering::Acquire) == READY
    }

    /// Ask the writer to flush and close. Does not wait.
    fn end(&self) {
        // Disconnected means the writer already stopped
        let _ = self.sender.send(StreamCommand::End);
    }

    /// Ask the writer to close and wait up to `timeout` for it to finish
    fn end_and_wait(mut self, timeout: Duration) -> bool {
        self.end();

        let Some(handle) = self.worker.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if handle.join().is_err() {
                    eprintln!(
                        "[LOGGER ERROR] File writer for '{}' panicked during close",
                        self.path.display()
                    );
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] File writer for '{}' did not close within timeout. \
                     Some lines may be lost.",
                    self.path.display()
                );
                return false;
            }

            thread::sleep(Duration::from_millis(5));
        }
    }
}

struct SinkState {
    stream: Option<LogStream>,
    /// Lines waiting for the stream to become ready. Unbounded.
    pending: VecDeque<String>,
    destroyed: bool,
}

/// Sink writing records to append-only files, one generation at a time.
///
/// # Example
///
/// ```no_run
/// use axe_logger::{FileSink, LogManager, Severity};
///
/// let manager = LogManager::new();
/// let sink = manager
///     .add_sink(
///         FileSink::builder()
///             .log_dir("/var/log/my-app")
///             .min_level(Severity::Debug)
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
///
/// manager.create_logger(Some("startup")).log("listening");
///
/// for file in sink.list_log_files().unwrap() {
///     println!("{} ({} bytes)", file.filename, file.size);
/// }
/// ```
pub struct FileSink {
    name: String,
    min_level: RwLock<Severity>,
    log_dir: PathBuf,
    filename_fn: FilenameFn,
    on_event: Option<StreamEventCallback>,
    timestamp_format: TimestampFormat,
    state: Mutex<SinkState>,
}

impl FileSink {
    pub const DEFAULT_NAME: &'static str = "FileSink";

    /// A sink with default settings writing into `log_dir`
    pub fn new(log_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().log_dir(log_dir).build()
    }

    pub fn from_config(config: FileSinkConfig) -> Result<Self> {
        FileSinkBuilder::from_config(config).build()
    }

    pub fn builder() -> FileSinkBuilder {
        FileSinkBuilder::new()
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Path of the current generation, if a stream exists
    pub fn current_path(&self) -> Option<PathBuf> {
        self.state.lock().stream.as_ref().map(|s| s.path.clone())
    }

    pub fn state(&self) -> StreamState {
        let state = self.state.lock();
        if state.destroyed {
            return StreamState::Closed;
        }
        match &state.stream {
            Some(stream) => stream.state(),
            None => StreamState::NoStream,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == StreamState::Ready
    }

    /// Poll until the current stream is ready or `timeout` elapses
    pub fn wait_until_ready(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            match self.state() {
                StreamState::Ready => return true,
                StreamState::Failed | StreamState::Closed => return false,
                StreamState::NoStream | StreamState::Opening => {}
            }
            if start.elapsed() >= timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(2));
        }
    }

    /// Number of lines waiting for the stream to become ready.
    ///
    /// The backlog has no cap: a stream that never becomes ready keeps
    /// every line written to it in memory until the sink is closed.
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Start a new generation: close the current stream (if any) and open a
    /// fresh file. Also the way to retry after a failed open.
    ///
    /// Open failures are reported as [`StreamEvent::Error`], not here.
    pub fn open_new_file(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(LoggerError::other(format!(
                "FileSink '{}' has been destroyed",
                self.name
            )));
        }
        if let Some(previous) = state.stream.take() {
            previous.end();
        }
        state.stream = Some(self.open_log_stream());
        Ok(())
    }

    fn open_log_stream(&self) -> LogStream {
        let path = self.log_dir.join((self.filename_fn)());
        let (sender, receiver) = unbounded();
        let status = Arc::new(AtomicU8::new(OPENING));

        let writer = StreamWriter {
            sink_name: self.name.clone(),
            log_dir: self.log_dir.clone(),
            path: path.clone(),
            status: Arc::clone(&status),
            on_event: self.on_event.clone(),
        };

        let worker = match thread::Builder::new()
            .name(format!("axe-file-{}", self.name))
            .spawn(move || writer.run(receiver))
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                status.store(FAILED, Ordering::Release);
                report(
                    &self.name,
                    self.on_event.as_ref(),
                    StreamEvent::Error {
                        path: path.clone(),
                        error: LoggerError::io_operation(
                            "spawning file writer",
                            path.display().to_string(),
                            e,
                        ),
                    },
                );
                None
            }
        };

        LogStream {
            path,
            sender,
            status,
            worker,
        }
    }

    /// Queue one line for the current generation, opening a stream first
    /// if none exists. Never blocks on I/O.
    pub fn write_line(&self, line: impl Into<String>) {
        let mut state = self.state.lock();
        if state.destroyed {
            return;
        }
        if state.stream.is_none() {
            state.stream = Some(self.open_log_stream());
        }

        let SinkState {
            stream, pending, ..
        } = &mut *state;
        pending.push_back(line.into());

        if let Some(stream) = stream.as_ref().filter(|s| s.is_ready()) {
            // Backlog goes first so file order matches call order
            while let Some(line) = pending.pop_front() {
                if let Err(e) = stream.sender.send(StreamCommand::Write(line)) {
                    if let StreamCommand::Write(line) = e.into_inner() {
                        pending.push_front(line);
                    }
                    break;
                }
            }
        }
    }

    /// Render one record as a file line, including the trailing newline
    pub fn format_record(&self, record: &LogRecord) -> String {
        format!(
            "{}  {}  [{}]  {}\n",
            self.timestamp_format.format(record.timestamp()),
            record.level().padded_name(),
            record.context(),
            sanitize_line(record.message()),
        )
    }

    /// End the current stream and wait up to `timeout` for the writer to
    /// flush and close. The sink stays closed afterwards.
    ///
    /// Lines still waiting for the stream to become ready are discarded,
    /// not written.
    pub fn close(&self, timeout: Duration) -> bool {
        let (stream, abandoned) = {
            let mut state = self.state.lock();
            state.destroyed = true;
            (state.stream.take(), std::mem::take(&mut state.pending).len())
        };

        if abandoned > 0 {
            eprintln!(
                "[LOGGER WARNING] FileSink '{}' closed with {} buffered lines unwritten",
                self.name, abandoned
            );
        }

        match stream {
            Some(stream) => stream.end_and_wait(timeout),
            None => true,
        }
    }

    /// Files in the log directory with their size and timestamps, sorted by name.
    ///
    /// When the filesystem does not record creation time, the modification
    /// time is reported for both.
    pub fn list_log_files(&self) -> Result<Vec<LogFileInfo>> {
        let entries = fs::read_dir(&self.log_dir).map_err(|e| {
            LoggerError::io_operation("listing log files", self.log_dir.display().to_string(), e)
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified()?;
            let created = metadata.created().unwrap_or(modified);

            files.push(LogFileInfo {
                filename: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                created_epoch_ms: epoch_millis(created),
                modified_epoch_ms: epoch_millis(modified),
            });
        }

        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }

    /// Full text of one file in the log directory.
    ///
    /// `name` must be a plain file name; anything that could leave the log
    /// directory is rejected.
    pub fn read_log_file(&self, name: &str) -> Result<String> {
        if !is_plain_file_name(name) {
            return Err(LoggerError::invalid_file_name(name));
        }
        let path = self.log_dir.join(name);
        fs::read_to_string(&path).map_err(|e| {
            LoggerError::io_operation("reading log file", path.display().to_string(), e)
        })
    }
}

impl Sink for FileSink {
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
        self.write_line(self.format_record(record));
    }

    fn destroy(&self) {
        self.close(DEFAULT_CLOSE_TIMEOUT);
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Builder for [`FileSink`]
pub struct FileSinkBuilder {
    config: FileSinkConfig,
    filename_fn: Option<FilenameFn>,
    on_event: Option<StreamEventCallback>,
    timestamp_format: TimestampFormat,
}

impl FileSinkBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(FileSinkConfig::default())
    }

    #[must_use]
    pub fn from_config(config: FileSinkConfig) -> Self {
        Self {
            config,
            filename_fn: None,
            on_event: None,
            timestamp_format: TimestampFormat::default(),
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    #[must_use]
    pub fn min_level(mut self, level: Severity) -> Self {
        self.config.min_level = level;
        self
    }

    #[must_use]
    pub fn log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = log_dir.into();
        self
    }

    /// Defer opening the first file until the first write
    #[must_use]
    pub fn open_on_create(mut self, open: bool) -> Self {
        self.config.open_on_create = open;
        self
    }

    #[must_use]
    pub fn filename_fn(mut self, f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.filename_fn = Some(Arc::new(f));
        self
    }

    /// Receive ready/error/close notifications. Without a callback, errors
    /// are reported on stderr.
    #[must_use]
    pub fn on_event(mut self, f: impl Fn(&StreamEvent) + Send + Sync + 'static) -> Self {
        self.on_event = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    pub fn build(self) -> Result<FileSink> {
        if self.config.name.is_empty() {
            return Err(LoggerError::config("FileSink", "name is empty"));
        }
        if self.config.log_dir.as_os_str().is_empty() {
            return Err(LoggerError::config("FileSink", "log_dir is empty"));
        }

        let open_on_create = self.config.open_on_create;
        let sink = FileSink {
            name: self.config.name,
            min_level: RwLock::new(self.config.min_level),
            log_dir: self.config.log_dir,
            filename_fn: self
                .filename_fn
                .unwrap_or_else(|| Arc::new(default_log_filename) as FilenameFn),
            on_event: self.on_event,
            timestamp_format: self.timestamp_format,
            state: Mutex::new(SinkState {
                stream: None,
                pending: VecDeque::new(),
                destroyed: false,
            }),
        };

        if open_on_create {
            sink.open_new_file()?;
        }
        Ok(sink)
    }
}

impl Default for FileSinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// State moved onto a generation's writer thread
struct StreamWriter {
    sink_name: String,
    log_dir: PathBuf,
    path: PathBuf,
    status: Arc<AtomicU8>,
    on_event: Option<StreamEventCallback>,
}

impl StreamWriter {
    fn run(self, receiver: Receiver<StreamCommand>) {
        let mut writer = match self.open() {
            Ok(file) => BufWriter::new(file),
            Err(error) => {
                self.status.store(FAILED, Ordering::Release);
                self.emit(StreamEvent::Error {
                    path: self.path.clone(),
                    error,
                });
                self.emit(StreamEvent::Closed {
                    path: self.path.clone(),
                });
                return;
            }
        };

        self.status.store(READY, Ordering::Release);
        self.emit(StreamEvent::Ready {
            path: self.path.clone(),
        });

        for command in receiver.iter() {
            match command {
                StreamCommand::Write(line) => {
                    if let Err(e) = writer.write_all(line.as_bytes()) {
                        self.fail("writing log line", e);
                    }
                }
                StreamCommand::End => break,
            }

            // Keep the file current whenever the queue runs dry
            if receiver.is_empty() {
                if let Err(e) = writer.flush() {
                    self.fail("flushing log file", e);
                }
            }
        }

        if let Err(e) = writer.flush() {
            self.fail("flushing log file", e);
        }
        drop(writer);

        let _ = self
            .status
            .compare_exchange(READY, CLOSED, Ordering::AcqRel, Ordering::Acquire);
        self.emit(StreamEvent::Closed {
            path: self.path.clone(),
        });
    }

    fn open(&self) -> Result<fs::File> {
        fs::create_dir_all(&self.log_dir).map_err(|e| {
            LoggerError::io_operation(
                "creating log directory",
                self.log_dir.display().to_string(),
                e,
            )
        })?;

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LoggerError::io_operation("opening log file", self.path.display().to_string(), e)
            })
    }

    fn fail(&self, operation: &str, source: std::io::Error) {
        self.status.store(FAILED, Ordering::Release);
        self.emit(StreamEvent::Error {
            path: self.path.clone(),
            error: LoggerError::io_operation(operation, self.path.display().to_string(), source),
        });
    }

    fn emit(&self, event: StreamEvent) {
        report(&self.sink_name, self.on_event.as_ref(), event);
    }
}

fn report(sink_name: &str, on_event: Option<&StreamEventCallback>, event: StreamEvent) {
    match (on_event, &event) {
        (Some(callback), _) => callback(&event),
        (None, StreamEvent::Error { error, .. }) => {
            eprintln!("[LOGGER ERROR] FileSink '{}' stream error: {}", sink_name, error);
        }
        (None, _) => {}
    }
}

/// Escape line breaks so one record always occupies one line. Backslashes
/// are escaped first, so a literal `\n` in a message stays distinguishable.
fn sanitize_line(message: &str) -> String {
    message
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some_and(|f| f == name)
}
