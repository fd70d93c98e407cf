//! Rolling file logger with an in-memory buffer of recent lines.
//!
//! `init_logger` installs a global `tracing` subscriber that writes to
//! `<dir>/<app_name>.log` and forwards records from the `log` facade. A log
//! file over the size limit is rotated when the logger starts:
//! `<app>.log -> <app>.1.log -> ... -> <app>.N.log` (oldest dropped).

use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use chrono::Local;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

static RECENT: OnceLock<LineBuffer> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("log file error: {0}")]
    Io(#[from] io::Error),
    #[error("unknown log level '{0}'")]
    InvalidLevel(String),
    #[error("logger already initialized")]
    AlreadyInitialized,
    #[error("logger not initialized")]
    NotInitialized,
}

#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub max_file_bytes: u64,
    pub max_files: usize,
    pub buffer_capacity: usize,
    pub level: String,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            max_files: 3,
            buffer_capacity: 200,
            level: "info".into(),
        }
    }
}

/// Ring of the most recent formatted lines
#[derive(Debug, Clone)]
struct LineBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl LineBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn push_chunk(&self, chunk: &[u8]) {
        if self.capacity == 0 {
            return;
        }
        let Ok(mut lines) = self.lines.lock() else {
            return;
        };
        for line in String::from_utf8_lossy(chunk).lines() {
            if lines.len() == self.capacity {
                lines.pop_front();
            }
            lines.push_back(line.to_string());
        }
    }

    fn snapshot(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Appends to the log file and mirrors every line into the ring
#[derive(Debug, Clone)]
pub struct RollingWriter {
    file: Arc<Mutex<File>>,
    recent: LineBuffer,
}

impl RollingWriter {
    pub fn open(path: impl AsRef<Path>, buffer_capacity: usize) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
            recent: LineBuffer::new(buffer_capacity),
        })
    }

    pub fn recent_lines(&self) -> Vec<String> {
        self.recent.snapshot()
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        file.write_all(buf)?;
        self.recent.push_chunk(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Local time with milliseconds
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| LoggerError::InvalidLevel(level.to_string()))
}

/// Same threshold for the `log` facade, so filtered `log::debug!` calls stay cheap
fn log_filter(level: LevelFilter) -> log::LevelFilter {
    if level == LevelFilter::OFF {
        log::LevelFilter::Off
    } else if level == LevelFilter::ERROR {
        log::LevelFilter::Error
    } else if level == LevelFilter::WARN {
        log::LevelFilter::Warn
    } else if level == LevelFilter::INFO {
        log::LevelFilter::Info
    } else if level == LevelFilter::DEBUG {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Trace
    }
}

pub fn log_path(dir: &Path, app_name: &str) -> PathBuf {
    dir.join(format!("{app_name}.log"))
}

/// Shift `<app>.log` into the numbered backups if it exceeds `max_file_bytes`
pub fn rotate_logs(
    dir: &Path,
    app_name: &str,
    max_file_bytes: u64,
    max_files: usize,
) -> io::Result<bool> {
    let live = log_path(dir, app_name);
    let size = match fs::metadata(&live) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if size <= max_file_bytes {
        return Ok(false);
    }

    if max_files == 0 {
        fs::remove_file(&live)?;
        return Ok(true);
    }

    let backup = |n: usize| dir.join(format!("{app_name}.{n}.log"));
    let oldest = backup(max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for n in (1..max_files).rev() {
        let from = backup(n);
        if from.exists() {
            fs::rename(&from, backup(n + 1))?;
        }
    }
    fs::rename(&live, backup(1))?;
    Ok(true)
}

/// Build (without installing) the file subscriber
pub fn build_subscriber(
    writer: RollingWriter,
    level: LevelFilter,
) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_timer(LocalTimer)
        .with_ansi(false)
        .with_target(true)
        .with_max_level(level)
        .finish()
}

pub fn init_logger(dir: impl AsRef<Path>, app_name: &str) -> Result<(), LoggerError> {
    init_logger_with(dir, app_name, &LoggerOptions::default())
}

pub fn init_logger_with(
    dir: impl AsRef<Path>,
    app_name: &str,
    options: &LoggerOptions,
) -> Result<(), LoggerError> {
    let dir = dir.as_ref();
    if RECENT.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }
    let level = parse_level(&options.level)?;

    fs::create_dir_all(dir)?;
    rotate_logs(dir, app_name, options.max_file_bytes, options.max_files)?;
    let writer = RollingWriter::open(log_path(dir, app_name), options.buffer_capacity)?;
    let recent = writer.recent.clone();

    build_subscriber(writer, level)
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    RECENT
        .set(recent)
        .map_err(|_| LoggerError::AlreadyInitialized)?;
    log::set_max_level(log_filter(level));
    tracing::info!("Logger started: {}", log_path(dir, app_name).display());
    Ok(())
}

/// Lines written since start-up, oldest first. Empty before `init_logger`.
pub fn recent_lines() -> Vec<String> {
    RECENT.get().map(LineBuffer::snapshot).unwrap_or_default()
}

fn ensure_initialized() -> Result<(), LoggerError> {
    RECENT
        .get()
        .map(|_| ())
        .ok_or(LoggerError::NotInitialized)
}

pub fn info(msg: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_fills_file_and_ring() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let writer = RollingWriter::open(&path, 2).unwrap();

        tracing::subscriber::with_default(
            build_subscriber(writer.clone(), LevelFilter::DEBUG),
            || {
                tracing::debug!("first");
                tracing::info!("second");
                tracing::warn!("third");
                tracing::trace!("filtered");
            },
        );

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("first"));
        assert!(contents.contains("third"));
        assert!(!contents.contains("filtered"));

        let recent = writer.recent_lines();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].contains("second"));
        assert!(recent[1].contains("WARN"));
    }

    #[test]
    fn test_rotation_shifts_backups() {
        let dir = tempfile::tempdir().unwrap();
        let live = log_path(dir.path(), "app");
        fs::write(&live, "x".repeat(64)).unwrap();
        fs::write(dir.path().join("app.1.log"), "older").unwrap();
        fs::write(dir.path().join("app.2.log"), "oldest").unwrap();

        assert!(rotate_logs(dir.path(), "app", 16, 2).unwrap());

        assert!(!live.exists());
        assert_eq!(fs::read_to_string(dir.path().join("app.1.log")).unwrap().len(), 64);
        assert_eq!(fs::read_to_string(dir.path().join("app.2.log")).unwrap(), "older");
        assert!(!dir.path().join("app.3.log").exists());
    }

    #[test]
    fn test_small_file_not_rotated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(log_path(dir.path(), "app"), "tiny").unwrap();
        assert!(!rotate_logs(dir.path(), "app", 16, 2).unwrap());
        assert!(!rotate_logs(&dir.path().join("missing"), "app", 16, 2).unwrap());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level(" WARN ").unwrap(), LevelFilter::WARN);
        assert!(matches!(parse_level("loud"), Err(LoggerError::InvalidLevel(_))));
    }

    #[test]
    fn test_io_error_converts() {
        let err: LoggerError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, LoggerError::Io(_)));
        assert_eq!(err.to_string(), "log file error: denied");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_log_filter_mapping() {
        assert_eq!(log_filter(LevelFilter::OFF), log::LevelFilter::Off);
        assert_eq!(log_filter(LevelFilter::WARN), log::LevelFilter::Warn);
        assert_eq!(log_filter(LevelFilter::TRACE), log::LevelFilter::Trace);
    }

    #[test]
    fn test_helpers_require_init() {
        if RECENT.get().is_none() {
            assert!(matches!(info("hello"), Err(LoggerError::NotInitialized)));
            assert!(recent_lines().is_empty());
        }
    }
}
